//! Retry engine tests for resilient-proxy-core.
// crates/resilient-proxy-core/tests/retry_engine.rs
// ============================================================================
// Module: Retry Engine Tests
// Description: Attempt counting, reactivation, and failure propagation.
// Purpose: Ensure invocations are bounded and fatal failures pass through.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::VecDeque;
use std::error::Error as _;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use resilient_proxy_core::ActivationError;
use resilient_proxy_core::EventKind;
use resilient_proxy_core::EventSink;
use resilient_proxy_core::FailureClass;
use resilient_proxy_core::InvokeError;
use resilient_proxy_core::MemorySink;
use resilient_proxy_core::ResilientCall;
use resilient_proxy_core::RetryPolicy;

type TestResult = Result<(), String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
    Transient(&'static str),
    Fatal(&'static str),
}

impl fmt::Display for Failure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient(label) => write!(formatter, "transient: {label}"),
            Self::Fatal(label) => write!(formatter, "fatal: {label}"),
        }
    }
}

impl std::error::Error for Failure {}

fn classify(failure: &Failure) -> FailureClass {
    match failure {
        Failure::Transient(_) => FailureClass::Transient,
        Failure::Fatal(_) => FailureClass::Fatal,
    }
}

/// Delegate instance tagged with the activation that produced it.
#[derive(Debug)]
struct Instance {
    generation: usize,
}

/// Scripted outcomes consumed one per attempt; an empty script succeeds.
#[derive(Clone, Default)]
struct Script {
    outcomes: Arc<Mutex<VecDeque<Failure>>>,
}

impl Script {
    fn new(failures: impl IntoIterator<Item = Failure>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(failures.into_iter().collect())),
        }
    }

    fn attempt(&self, instance: &Instance) -> Result<usize, Failure> {
        match self.outcomes.lock().unwrap().pop_front() {
            Some(failure) => Err(failure),
            None => Ok(instance.generation),
        }
    }
}

fn counting_call(
    activations: &Arc<AtomicUsize>,
    sink: &Arc<MemorySink>,
) -> Result<ResilientCall<Instance, Failure>, ActivationError> {
    let counter = Arc::clone(activations);
    ResilientCall::builder(
        "IThing",
        move || Ok(Instance { generation: counter.fetch_add(1, Ordering::SeqCst) + 1 }),
        classify,
    )
    .sink(Arc::clone(sink) as Arc<dyn EventSink>)
    .build()
}

#[test]
fn success_on_first_attempt_does_not_reactivate() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::default();

    let generation =
        call.invoke_func(|instance| script.attempt(instance)).map_err(|err| err.to_string())?;

    assert_eq!(generation, 1);
    assert_eq!(activations.load(Ordering::SeqCst), 1);
    assert!(sink.events_of(EventKind::Reactivating).is_empty());
    Ok(())
}

#[test]
fn transient_failure_reactivates_and_retries_on_new_instance() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::new([Failure::Transient("channel faulted")]);

    let generation =
        call.invoke_func(|instance| script.attempt(instance)).map_err(|err| err.to_string())?;

    assert_eq!(generation, 2);
    assert_eq!(activations.load(Ordering::SeqCst), 2);
    let warnings = sink.events_of(EventKind::Reactivating);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].contract.as_deref(), Some("IThing"));
    assert!(warnings[0].message.contains("channel faulted"));
    Ok(())
}

#[test]
fn persistent_transient_failure_exhausts_after_max_attempts() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::new([
        Failure::Transient("first"),
        Failure::Transient("second"),
        Failure::Transient("third"),
        Failure::Transient("never reached"),
    ]);
    let attempts = AtomicUsize::new(0);

    let result = call.invoke_func(|instance| {
        attempts.fetch_add(1, Ordering::SeqCst);
        script.attempt(instance)
    });

    match result {
        Err(InvokeError::Exhausted { attempts: max, last }) => {
            assert_eq!(max, 3);
            assert_eq!(last, Failure::Transient("third"));
        }
        other => return Err(format!("expected exhaustion, got {other:?}")),
    }
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(activations.load(Ordering::SeqCst), 4);
    assert_eq!(sink.events_of(EventKind::Reactivating).len(), 3);
    Ok(())
}

#[test]
fn exhausted_error_names_bound_and_keeps_last_failure_as_source() -> TestResult {
    let call: ResilientCall<Instance, Failure> =
        ResilientCall::builder("IThing", || Ok(Instance { generation: 1 }), classify)
            .policy(RetryPolicy::new(2))
            .build()
            .map_err(|err| err.to_string())?;

    let Err(error) = call.invoke_func(|_| Err::<(), _>(Failure::Transient("down"))) else {
        return Err("expected failure".to_string());
    };

    assert!(error.is_exhausted());
    assert_eq!(
        error.to_string(),
        "exceeded maximum reactivations (2) trying to execute operation"
    );
    let source = error.source().map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("transient: down"));
    Ok(())
}

#[test]
fn fatal_failure_propagates_unmodified_without_reactivation() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::new([Failure::Fatal("bad argument")]);

    let error = match call.invoke_func(|instance| script.attempt(instance)) {
        Err(error) => error,
        Ok(value) => return Err(format!("expected fatal failure, got {value}")),
    };

    assert_eq!(error.to_string(), "fatal: bad argument");
    assert_eq!(error.into_fatal(), Some(Failure::Fatal("bad argument")));
    assert_eq!(activations.load(Ordering::SeqCst), 1);
    assert!(sink.events().is_empty());
    Ok(())
}

#[test]
fn fatal_failure_after_transient_failure_stops_retrying() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::new([Failure::Transient("blip"), Failure::Fatal("rejected")]);

    let result = call.invoke_func(|instance| script.attempt(instance));

    assert!(matches!(result, Err(InvokeError::Fatal(Failure::Fatal("rejected")))));
    assert_eq!(activations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn construction_failure_propagates_without_retry() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&activations);
    let result: Result<ResilientCall<Instance, Failure>, _> = ResilientCall::builder(
        "IThing",
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(ActivationError::Service("host unavailable".to_string()))
        },
        classify,
    )
    .build();

    assert_eq!(result.err(), Some(ActivationError::Service("host unavailable".to_string())));
    assert_eq!(activations.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn reactivation_failure_surfaces_activation_error() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&activations);
    let call: ResilientCall<Instance, Failure> = ResilientCall::builder(
        "IThing",
        move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Instance { generation: 1 })
            } else {
                Err(ActivationError::Service("host crashed".to_string()))
            }
        },
        classify,
    )
    .build()
    .map_err(|err| err.to_string())?;

    let result = call.invoke_func(|_| Err::<(), _>(Failure::Transient("lost")));

    assert!(matches!(
        result,
        Err(InvokeError::Activation(ActivationError::Service(ref cause))) if cause == "host crashed"
    ));
    assert_eq!(activations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn invoke_action_shares_retry_semantics() -> TestResult {
    let activations = Arc::new(AtomicUsize::new(0));
    let sink = Arc::new(MemorySink::new());
    let call = counting_call(&activations, &sink).map_err(|err| err.to_string())?;
    let script = Script::new([Failure::Transient("blip")]);
    let seen = Mutex::new(Vec::new());

    call.invoke_action(|instance| {
        script.attempt(instance)?;
        seen.lock().unwrap().push(instance.generation);
        Ok(())
    })
    .map_err(|err| err.to_string())?;

    assert_eq!(*seen.lock().unwrap(), vec![2]);
    Ok(())
}

#[test]
fn concurrent_invocations_are_serialized() -> TestResult {
    let call: Arc<ResilientCall<Instance, Failure>> = Arc::new(
        ResilientCall::builder("IThing", || Ok(Instance { generation: 1 }), classify)
            .build()
            .map_err(|err| err.to_string())?,
    );
    let in_flight = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0 .. 4)
        .map(|_| {
            let call = Arc::clone(&call);
            let in_flight = Arc::clone(&in_flight);
            let overlaps = Arc::clone(&overlaps);
            thread::spawn(move || {
                for _ in 0 .. 25 {
                    call.invoke_func(|_| {
                        if in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::yield_now();
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        Ok::<(), Failure>(())
                    })
                    .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().map_err(|_| "worker panicked".to_string())?;
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn delegate_stays_locked_while_operation_runs() -> TestResult {
    let call: Arc<ResilientCall<Instance, Failure>> = Arc::new(
        ResilientCall::builder("IThing", || Ok(Instance { generation: 1 }), classify)
            .build()
            .map_err(|err| err.to_string())?,
    );
    let (started_tx, started_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (done_tx, done_rx) = mpsc::channel();

    let holder = Arc::clone(&call);
    let first = thread::spawn(move || {
        holder
            .invoke_func(|_| {
                started_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                Ok::<(), Failure>(())
            })
            .unwrap();
    });
    started_rx.recv().map_err(|err| err.to_string())?;
    let waiter = Arc::clone(&call);
    let second = thread::spawn(move || {
        waiter.invoke_func(|instance| Ok::<_, Failure>(instance.generation)).unwrap();
        done_tx.send(()).unwrap();
    });

    assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
    release_tx.send(()).map_err(|err| err.to_string())?;
    done_rx.recv_timeout(Duration::from_secs(10)).map_err(|err| err.to_string())?;
    first.join().map_err(|_| "holder panicked".to_string())?;
    second.join().map_err(|_| "waiter panicked".to_string())?;
    Ok(())
}

#[test]
fn panicking_operation_poisons_the_delegate() -> TestResult {
    let call: Arc<ResilientCall<Instance, Failure>> = Arc::new(
        ResilientCall::builder("IThing", || Ok(Instance { generation: 1 }), classify)
            .build()
            .map_err(|err| err.to_string())?,
    );
    let worker = Arc::clone(&call);
    let joined = thread::spawn(move || {
        let _ = worker.invoke_func(|_| -> Result<(), Failure> { panic!("delegate blew up") });
    })
    .join();
    assert!(joined.is_err());

    let result = call.invoke_func(|instance| Ok::<_, Failure>(instance.generation));

    assert!(matches!(result, Err(InvokeError::Poisoned(ref contract)) if contract == "IThing"));
    Ok(())
}

proptest! {
    #[test]
    fn fewer_transient_failures_than_bound_succeed(max in 1u32 .. 8, failures in 0usize .. 8) {
        let failures = failures % usize::try_from(max).unwrap();
        let activations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&activations);
        let call: ResilientCall<Instance, Failure> = ResilientCall::builder(
            "IThing",
            move || Ok(Instance { generation: counter.fetch_add(1, Ordering::SeqCst) + 1 }),
            classify,
        )
        .policy(RetryPolicy::new(max))
        .build()
        .unwrap();
        let script = Script::new(std::iter::repeat_n(Failure::Transient("blip"), failures));

        let generation = call.invoke_func(|instance| script.attempt(instance)).unwrap();

        prop_assert_eq!(generation, failures + 1);
        prop_assert_eq!(activations.load(Ordering::SeqCst), failures + 1);
    }

    #[test]
    fn attempts_never_exceed_bound(max in 1u32 .. 8) {
        let attempts = AtomicUsize::new(0);
        let call: ResilientCall<Instance, Failure> =
            ResilientCall::builder("IThing", || Ok(Instance { generation: 1 }), classify)
                .policy(RetryPolicy::new(max))
                .build()
                .unwrap();

        let result = call.invoke_func(|_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(Failure::Transient("down"))
        });

        prop_assert!(result.is_err());
        prop_assert_eq!(attempts.load(Ordering::SeqCst), usize::try_from(max).unwrap());
    }
}
