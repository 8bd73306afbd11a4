use super::*;
use crate::backend::{Backend, Postgres};
use crate::error::QueryError;
use crate::query::Query;

fn rendered(sql: &str, params: &Params) -> String {
    Postgres.substitute(sql, params).unwrap()
}

#[test]
fn equals_binds_a_placeholder() {
    let cmp = Op::equals("golf").resolve("game").unwrap();
    assert!(cmp.sql().starts_with(r#""game" = :p"#), "{}", cmp.sql());
    assert_eq!(cmp.params().len(), 1);
    assert_eq!(
        cmp.params().values().next().unwrap(),
        &Value::Text("golf".to_string())
    );
    assert_eq!(rendered(cmp.sql(), cmp.params()), r#""game" = 'golf'"#);
}

#[test]
fn equals_null_renders_is_null() {
    let cmp = Op::equals(Value::Null).resolve("deleted_at").unwrap();
    assert_eq!(cmp.sql(), r#""deleted_at" IS NULL"#);
    assert!(cmp.params().is_empty());
}

#[test]
fn not_equals_null_renders_is_not_null() {
    let cmp = Op::not_equals(None::<i64>).resolve("deleted_at").unwrap();
    assert_eq!(cmp.sql(), r#""deleted_at" IS NOT NULL"#);
    assert!(cmp.params().is_empty());
}

#[test]
fn other_operators_inline_null_verbatim() {
    // Only equality operators get the IS/IS NOT rewrite.
    let cmp = Op::less_than(Value::Null).resolve("age").unwrap();
    assert_eq!(cmp.sql(), r#""age" < NULL"#);
    assert!(cmp.params().is_empty());
}

#[test]
fn booleans_render_inline_without_binding() {
    let cmp = Op::equals(true).resolve("active").unwrap();
    assert_eq!(cmp.sql(), r#""active" = true"#);
    assert!(cmp.params().is_empty());
}

#[test]
fn not_equals_uses_angle_brackets() {
    let cmp = Op::not_equals(5).resolve("rank").unwrap();
    assert_eq!(rendered(cmp.sql(), cmp.params()), r#""rank" <> 5"#);
}

#[test]
fn between_binds_both_bounds() {
    let cmp = Op::between(1, 5).resolve("age").unwrap();
    assert_eq!(cmp.params().len(), 2);
    assert_eq!(rendered(cmp.sql(), cmp.params()), r#""age" BETWEEN 1 AND 5"#);
}

#[test]
fn in_list_binds_each_element() {
    let cmp = Op::in_list([1, 2, 3]).resolve("id").unwrap();
    assert_eq!(cmp.params().len(), 3);
    assert_eq!(rendered(cmp.sql(), cmp.params()), r#""id" IN (1,2,3)"#);
}

#[test]
fn not_in_list() {
    let cmp = Op::not_in(["a", "b"]).resolve("tag").unwrap();
    assert_eq!(rendered(cmp.sql(), cmp.params()), r#""tag" NOT IN ('a','b')"#);
}

#[test]
fn empty_in_list_is_rejected() {
    let err = Op::in_list(Vec::<i64>::new()).resolve("id").unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedOperand(_)));
}

#[test]
fn ilike_is_case_insensitive_match() {
    let cmp = Op::ilike("%admin%").resolve("username").unwrap();
    assert_eq!(
        rendered(cmp.sql(), cmp.params()),
        r#""username" ILIKE '%admin%'"#
    );
}

#[test]
fn comparison_against_function_result() {
    let cmp = Op::equals(Func::count()).resolve("total").unwrap();
    assert_eq!(cmp.sql(), r#""total" = COUNT(*)"#);
    assert!(cmp.params().is_empty());
}

#[test]
fn resolve_value_treats_left_as_operand() {
    let cmp = Op::greater_than(5).resolve_value(Func::count()).unwrap();
    assert_eq!(rendered(cmp.sql(), cmp.params()), "COUNT(*) > 5");
}

#[test]
fn column_to_column_comparison() {
    let cmp = Op::equals(Ident::parse("roles.id").unwrap())
        .resolve("users.role_id")
        .unwrap();
    assert_eq!(cmp.sql(), r#""users"."role_id" = "roles"."id""#);
    assert!(cmp.params().is_empty());
}

#[test]
fn raw_sql_operand_passes_through() {
    let cmp = Op::greater_or_equal(RawSql::new("now() - interval '1 day'"))
        .resolve("created_at")
        .unwrap();
    assert_eq!(cmp.sql(), r#""created_at" >= now() - interval '1 day'"#);
}

#[test]
fn identical_call_sites_get_distinct_placeholders() {
    let a = Op::equals(10).resolve("x").unwrap();
    let b = Op::equals(10).resolve("x").unwrap();
    let name = a.params().keys().next().unwrap();
    assert!(!b.params().contains_key(name));
}

#[test]
fn and_wraps_each_side() {
    let a = Op::equals("golf").resolve("game").unwrap();
    let b = Op::greater_than(10).resolve("score").unwrap();
    let expr = BoolExpr::and([a.into(), b.into()]).unwrap();
    assert_eq!(
        rendered(expr.sql(), expr.params()),
        r#"("game" = 'golf') AND ("score" > 10)"#
    );
}

#[test]
fn nested_or_of_and_parenthesizes_each_level() {
    let a = Op::equals("golf").resolve("game").unwrap();
    let b = Op::greater_than(10).resolve("score").unwrap();
    let c = Op::equals(1).resolve("league").unwrap();
    let inner = BoolExpr::and([a.into(), b.into()]).unwrap();
    let outer = BoolExpr::or([inner, c.into()]).unwrap();
    assert_eq!(
        rendered(outer.sql(), outer.params()),
        r#"(("game" = 'golf') AND ("score" > 10)) OR ("league" = 1)"#
    );
}

#[test]
fn join_and_rewraps_in_place() {
    let a = Op::equals("golf").resolve("game").unwrap();
    let b = Op::greater_than(10).resolve("score").unwrap();
    let c = Op::equals(1).resolve("league").unwrap();
    let mut expr = BoolExpr::from(a);
    expr.join_and(b);
    expr.join_or(c);
    assert_eq!(
        rendered(expr.sql(), expr.params()),
        r#"(("game" = 'golf') AND ("score" > 10)) OR ("league" = 1)"#
    );
}

#[test]
fn all_equal_mapping() {
    let expr =
        BoolExpr::all_equal([("game", Operand::from("golf")), ("player_id", Operand::from(212))])
            .unwrap();
    assert_eq!(
        rendered(expr.sql(), expr.params()),
        r#"("game" = 'golf') AND ("player_id" = 212)"#
    );
}

#[test]
fn any_equal_shares_one_column() {
    let expr = BoolExpr::any_equal("game", ["golf", "pacman", "bowling"]).unwrap();
    assert_eq!(
        rendered(expr.sql(), expr.params()),
        r#"("game" = 'golf') OR ("game" = 'pacman') OR ("game" = 'bowling')"#
    );
}

#[test]
fn any_of_with_operators() {
    let expr = BoolExpr::any_of([
        ("score", Op::greater_than(90)),
        ("rank", Op::equals(1)),
    ])
    .unwrap();
    assert_eq!(
        rendered(expr.sql(), expr.params()),
        r#"("score" > 90) OR ("rank" = 1)"#
    );
}

#[test]
fn empty_combination_is_rejected() {
    assert_eq!(
        BoolExpr::and(Vec::new()).unwrap_err(),
        QueryError::EmptyFilterSet
    );
    assert_eq!(
        BoolExpr::all_equal(Vec::<(&str, i64)>::new()).unwrap_err(),
        QueryError::EmptyFilterSet
    );
}

#[test]
fn in_sub_query_embeds_parenthesized_and_merges_params() {
    let mut sub = Query::new();
    sub.table("banned")
        .projection(["user_id"])
        .filter(vec![("reason", Op::equals("spam"))]);
    let cmp = Op::in_query(sub).resolve("id").unwrap();
    assert!(
        cmp.sql()
            .starts_with(r#""id" IN (SELECT "user_id" FROM "banned" WHERE ("reason" = :p"#),
        "{}",
        cmp.sql()
    );
    assert!(cmp.sql().ends_with("))"));
    assert_eq!(cmp.params().len(), 1);
}

#[test]
fn count_star_and_alias() {
    assert_eq!(Func::count().to_sql(), "COUNT(*)");
    assert_eq!(
        Func::count().aliased("n").unwrap().to_sql(),
        r#"COUNT(*) AS "n""#
    );
}

#[test]
fn named_functions_quote_their_column() {
    assert_eq!(Func::min("age").unwrap().to_sql(), r#"MIN("age")"#);
    assert_eq!(Func::max("age").unwrap().to_sql(), r#"MAX("age")"#);
    assert_eq!(Func::avg("score").unwrap().to_sql(), r#"AVG("score")"#);
    assert_eq!(Func::lower("name").unwrap().to_sql(), r#"LOWER("name")"#);
    assert_eq!(
        Func::upper("name").unwrap().aliased("u").unwrap().to_sql(),
        r#"UPPER("name") AS "u""#
    );
    assert_eq!(Func::distinct("col").unwrap().to_sql(), r#"DISTINCT("col")"#);
}

#[test]
fn count_of_star_and_nested_function() {
    assert_eq!(Func::count_of("*").unwrap().to_sql(), "COUNT(*)");
    assert_eq!(
        Func::count_of(Func::distinct("id").unwrap()).unwrap().to_sql(),
        r#"COUNT(DISTINCT("id"))"#
    );
}

#[test]
fn bare_alias() {
    assert_eq!(
        Func::alias("age", "years").unwrap().to_sql(),
        r#""age" AS "years""#
    );
}

#[test]
fn relation_joins_parts_with_dots() {
    assert_eq!(
        Func::relation(["mytable", "columnA"]).unwrap().to_sql(),
        r#""mytable"."columnA""#
    );
    assert_eq!(Func::relation(["u", "*"]).unwrap().to_sql(), r#""u".*"#);
    assert_eq!(
        Func::relation(["public", "users"])
            .unwrap()
            .aliased("u")
            .unwrap()
            .to_sql(),
        r#""public"."users" AS "u""#
    );
}

#[test]
fn func_construction_rejects_bad_input() {
    assert!(Func::alias("a", "").unwrap_err().is_invalid_identifier());
    assert!(Func::min("").is_err());
    assert!(Func::relation(Vec::<&str>::new()).is_err());
}
