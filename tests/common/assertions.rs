//! Custom test assertions

use coalesce_rs::{BatchError, Outcome};

/// Assert every outcome is a whole-batch failure sharing one error instance
pub fn assert_shared_batch_failure<V: std::fmt::Debug, E: std::fmt::Debug>(
    outcomes: &[Outcome<V, E>],
) {
    let errors: Vec<&BatchError<E>> = outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(value) => panic!("Expected batch failure, got value {:?}", value),
            Err(err) => err,
        })
        .collect();

    for err in &errors {
        assert!(err.is_batch_failure(), "Expected batch failure, got {:?}", err);
        assert!(
            err.same_instance(errors[0]),
            "Expected one shared error, got {:?} and {:?}",
            err,
            errors[0]
        );
    }
}

/// Assert the successful outcomes equal `expected`, in order
pub fn assert_values<V, E>(outcomes: Vec<Outcome<V, E>>, expected: &[&str])
where
    V: std::fmt::Debug + PartialEq<str>,
    E: std::fmt::Debug,
{
    assert_eq!(outcomes.len(), expected.len(), "outcome count mismatch");
    for (outcome, expected) in outcomes.into_iter().zip(expected) {
        match outcome {
            Ok(value) => assert!(
                value == **expected,
                "Expected {:?}, got {:?}",
                expected,
                value
            ),
            Err(err) => panic!("Expected {:?}, got error {:?}", expected, err),
        }
    }
}
