use futures::executor::block_on;
use proptest::prelude::*;
use ruletree_core::{
    env_fn, Environment, Field, Input, Method, Outcome, Path, PathError, Ref, Rule,
};

/// Parses the first submitted text as an integer.
struct Int;

impl Field<String> for Int {
    type Value = i64;

    fn evaluate(&self, _method: Method, inputs: &[Input]) -> Outcome<String, i64> {
        match inputs.first().and_then(Input::as_text) {
            Some(text) => text.parse::<i64>().map_err(|e| e.to_string()).into(),
            None => Outcome::Failure("required".to_string()),
        }
    }
}

/// Always fails with its message.
struct Fail(String);

impl Field<String> for Fail {
    type Value = i64;

    fn evaluate(&self, _method: Method, _inputs: &[Input]) -> Outcome<String, i64> {
        Outcome::Failure(self.0.clone())
    }
}

fn ref_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn env_with(values: Vec<(&'static str, String)>) -> impl Environment {
    env_fn(move |path: &Path| {
        values
            .iter()
            .filter(|(key, _)| Path::parse(key) == *path)
            .map(|(_, value)| Input::text(value.clone()))
            .collect()
    })
}

fn bounded(limit: i64, step: i64) -> impl Fn(i64) -> Outcome<String, i64> + Clone + Send + Sync + 'static {
    move |x| {
        if x.abs() > limit {
            Outcome::Failure(format!("{} exceeds {}", x, limit))
        } else {
            Outcome::Success(x + step)
        }
    }
}

proptest! {
    #[test]
    fn transform_fusion_is_associative(
        input in -100i64..100,
        f_limit in 0i64..100,
        f_step in -20i64..20,
        g_limit in 0i64..100,
        g_step in -20i64..20,
    ) {
        let f = bounded(f_limit, f_step);
        let g = bounded(g_limit, g_step);
        let env = env_with(vec![("n", input.to_string())]);

        let chained = Rule::leaf(Int).validate(f.clone()).validate(g.clone()).named("n");
        let fused = Rule::leaf(Int)
            .validate(move |x| f(x).and_then(|y| g(y)))
            .named("n");

        let left = block_on(chained.eval(Method::Submit, &env));
        let right = block_on(fused.eval(Method::Submit, &env));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn combine_gathers_both_errors_in_order(e1 in ".{0,12}", e2 in ".{0,12}") {
        let rule = Rule::leaf(Fail(e1.clone())).zip(Rule::leaf(Fail(e2.clone())));
        let (outcome, _) = block_on(rule.eval(Method::Submit, &ruletree_core::NoInput));
        prop_assert_eq!(
            outcome,
            Outcome::Failure(vec![
                PathError::new(Path::root(), e1),
                PathError::new(Path::root(), e2),
            ])
        );
    }

    #[test]
    fn identity_view_map_changes_nothing(
        a in -50i64..50,
        b in "[0-9a-z]{0,3}",
        limit in 0i64..50,
    ) {
        let rule = Rule::leaf(Int)
            .validate(bounded(limit, 1))
            .named("a")
            .zip(Rule::leaf(Int).named("b"));
        let env = env_with(vec![("a", a.to_string()), ("b", b)]);

        let plain = block_on(rule.eval(Method::Submit, &env));
        let mapped = block_on(rule.map_errors(|e: String| e).eval(Method::Submit, &env));
        prop_assert_eq!(plain, mapped);
    }

    #[test]
    fn view_map_commutes_with_evaluation(a in "[0-9x]{1,3}", b in "[0-9x]{1,3}") {
        let rule = Rule::leaf(Int).named("a").zip(Rule::leaf(Int).named("b"));
        let env = env_with(vec![("a", a), ("b", b)]);

        let (mapped, _) = block_on(rule.map_errors(|e: String| e.len()).eval(Method::Submit, &env));
        let (plain, _) = block_on(rule.eval(Method::Submit, &env));
        let expected = plain.map_err(|errors| {
            errors
                .into_iter()
                .map(|e| PathError::new(e.path, e.error.len()))
                .collect::<Vec<_>>()
        });
        prop_assert_eq!(mapped, expected);
    }

    #[test]
    fn transforms_are_transparent_to_names(name in ref_name(), step in -5i64..5) {
        let plain = Rule::leaf(Int).named(name.as_str());
        let wrapped = plain.clone().map(move |x| x + step);
        let path = Path::parse(&name);

        prop_assert_eq!(plain.get_ref(), Some(Ref::new(name.clone())));
        prop_assert_eq!(wrapped.get_ref(), plain.get_ref());
        prop_assert_eq!(wrapped.lookup(&path).len(), plain.lookup(&path).len());
        prop_assert_eq!(wrapped.paths(), plain.paths());
    }

    #[test]
    fn nested_names_round_trip(a in ref_name(), b in ref_name()) {
        let rule = Rule::leaf(Int).named(b.as_str()).named(a.as_str());

        let exact = rule.lookup(&Path::from([a.as_str(), b.as_str()]));
        prop_assert_eq!(exact.len(), 1);
        prop_assert!(exact[0].to_field().is_some());
        prop_assert!(rule.lookup(&Path::from([a.as_str()])).is_empty());
        prop_assert!(rule.lookup(&Path::from([a.as_str(), b.as_str(), "c"])).is_empty());
    }
}
