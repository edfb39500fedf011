/*
 * orchestrator.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Concurrent execution of checkers.
 *
 * Every checker runs on its own scoped thread over the same read-only parts.
 * Diagnostics stream back over a single channel as they are found, and each
 * worker ends with exactly one completion message carrying its outcome.
 */

use crate::checks::{CheckError, Checker};
use crate::part::RecipePart;
use crossbeam_channel::{Sender, unbounded};
use recipelint_error_reporting::Diagnostic;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use tracing::{debug, error};

/// Messages sent from checker threads to the consumer.
enum WorkerMessage {
    Diagnostic(Diagnostic),
    /// Sent last, exactly once per checker
    Finished {
        index: usize,
        result: Result<(), CheckError>,
    },
}

/// How one checker ended.
#[derive(Debug)]
pub struct CheckerOutcome {
    pub checker: &'static str,
    pub result: Result<(), CheckError>,
}

/// Summary of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Whether any error-level diagnostic was seen
    pub have_error: bool,
    /// One entry per checker, in registration order
    pub outcomes: Vec<CheckerOutcome>,
}

impl RunReport {
    /// Checkers that failed internally.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &CheckError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|err| (outcome.checker, err)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Run all `checkers` concurrently over `parts`.
///
/// `consumer` is called on the calling thread for every diagnostic, in the
/// order they arrive. Diagnostics from different checkers interleave
/// arbitrarily. A checker that fails or panics does not stop the others.
pub fn run_checkers(
    checkers: &[Box<dyn Checker>],
    parts: &[RecipePart],
    mut consumer: impl FnMut(Diagnostic),
) -> RunReport {
    let mut have_error = false;
    let mut results: Vec<Option<Result<(), CheckError>>> =
        checkers.iter().map(|_| None).collect();

    thread::scope(|scope| {
        let (sender, receiver) = unbounded();
        for (index, checker) in checkers.iter().enumerate() {
            let sender = sender.clone();
            scope.spawn(move || run_worker(index, checker.as_ref(), parts, &sender));
        }
        // Only the workers hold senders now.
        drop(sender);

        let mut active = checkers.len();
        while active > 0 {
            let Ok(message) = receiver.recv() else {
                break;
            };
            match message {
                WorkerMessage::Diagnostic(diagnostic) => {
                    have_error |= diagnostic.is_error();
                    consumer(diagnostic);
                }
                WorkerMessage::Finished { index, result } => {
                    active -= 1;
                    results[index] = Some(result);
                }
            }
        }
    });

    let outcomes = checkers
        .iter()
        .zip(results)
        .map(|(checker, result)| CheckerOutcome {
            checker: checker.name(),
            result: result.unwrap_or_else(|| {
                Err(CheckError::Panicked("worker exited without reporting".to_string()))
            }),
        })
        .collect();

    RunReport {
        have_error,
        outcomes,
    }
}

fn run_worker(
    index: usize,
    checker: &dyn Checker,
    parts: &[RecipePart],
    sender: &Sender<WorkerMessage>,
) {
    let name = checker.name();
    debug!(checker = name, "checker started");

    let mut sink = |diagnostic: Diagnostic| {
        // The receiver outlives every worker, so this cannot fail.
        let _ = sender.send(WorkerMessage::Diagnostic(diagnostic));
    };
    let result = match catch_unwind(AssertUnwindSafe(|| checker.check(parts, &mut sink))) {
        Ok(result) => result,
        Err(payload) => Err(CheckError::Panicked(panic_message(payload.as_ref()))),
    };

    match &result {
        Ok(()) => debug!(checker = name, "checker finished"),
        Err(err) => error!(checker = name, error = %err, "checker failed"),
    }
    let _ = sender.send(WorkerMessage::Finished { index, result });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::ScriptPart;
    use recipelint_error_reporting::Level;

    /// Emits one diagnostic per part, at the given level.
    struct PerPart(&'static str, Level);

    impl Checker for PerPart {
        fn name(&self) -> &'static str {
            self.0
        }

        fn check(
            &self,
            parts: &[RecipePart],
            sink: &mut dyn FnMut(Diagnostic),
        ) -> Result<(), CheckError> {
            for (i, part) in parts.iter().enumerate() {
                sink(Diagnostic::new(self.1, self.0, part.file_name(), i + 1, 0));
            }
            Ok(())
        }
    }

    struct Failing;

    impl Checker for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn check(
            &self,
            _parts: &[RecipePart],
            sink: &mut dyn FnMut(Diagnostic),
        ) -> Result<(), CheckError> {
            sink(Diagnostic::warning("before failing", "x.sh", 1, 0));
            Err(CheckError::ToolOutput {
                tool: "failing",
                message: "bad output".to_string(),
            })
        }
    }

    struct Panicking;

    impl Checker for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn check(
            &self,
            _parts: &[RecipePart],
            _sink: &mut dyn FnMut(Diagnostic),
        ) -> Result<(), CheckError> {
            panic!("checker bug");
        }
    }

    fn parts(count: usize) -> Vec<RecipePart> {
        (0..count)
            .map(|i| {
                RecipePart::Script(ScriptPart {
                    file_name: format!("p{}.sh", i),
                    line_offset: 0,
                    column_offset: 0,
                    content: Vec::new(),
                    key_name: None,
                    is_system_requirement: false,
                })
            })
            .collect()
    }

    #[test]
    fn test_concurrent_run_matches_sequential_run() {
        let checkers: Vec<Box<dyn Checker>> = vec![
            Box::new(PerPart("a", Level::Info)),
            Box::new(PerPart("b", Level::Warning)),
            Box::new(PerPart("c", Level::Style)),
        ];
        let parts = parts(20);

        let mut concurrent = Vec::new();
        let report = run_checkers(&checkers, &parts, |d| concurrent.push(d));

        let mut sequential = Vec::new();
        for checker in &checkers {
            checker.check(&parts, &mut |d| sequential.push(d)).unwrap();
        }

        concurrent.sort();
        sequential.sort();
        assert_eq!(concurrent, sequential);
        assert!(!report.have_error);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_one_outcome_per_checker_in_registration_order() {
        let checkers: Vec<Box<dyn Checker>> = vec![
            Box::new(PerPart("first", Level::Error)),
            Box::new(Failing),
            Box::new(PerPart("last", Level::Info)),
        ];
        let mut count = 0;
        let report = run_checkers(&checkers, &parts(2), |_| count += 1);

        let names: Vec<&str> = report.outcomes.iter().map(|o| o.checker).collect();
        assert_eq!(names, vec!["first", "failing", "last"]);
        // Diagnostics sent before a failure are kept.
        assert_eq!(count, 5);
        assert!(report.have_error);

        let failures: Vec<&str> = report.failures().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["failing"]);
    }

    #[test]
    fn test_panicking_checker_only_ends_itself() {
        let checkers: Vec<Box<dyn Checker>> =
            vec![Box::new(Panicking), Box::new(PerPart("ok", Level::Info))];
        let mut seen = Vec::new();
        let report = run_checkers(&checkers, &parts(3), |d| seen.push(d));

        assert_eq!(seen.len(), 3);
        match &report.outcomes[0].result {
            Err(CheckError::Panicked(message)) => assert_eq!(message, "checker bug"),
            other => panic!("expected a panic outcome, got {:?}", other),
        }
        assert!(report.outcomes[1].result.is_ok());
    }

    #[test]
    fn test_no_checkers() {
        let report = run_checkers(&[], &parts(1), |_| panic!("no diagnostics expected"));
        assert!(report.outcomes.is_empty());
        assert!(!report.have_error);
    }
}
