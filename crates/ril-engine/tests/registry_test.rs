//! Registry behaviour under concurrent callers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use ril_engine::{Completion, RegistryError, RequestRegistry};
use ril_protocol::{RequestCode, Response};

#[test]
fn test_register_take_exactly_once() {
    let registry = RequestRegistry::new();
    let (completion, rx) = Completion::channel();
    registry
        .register(7, RequestCode::DIAL, completion, Vec::new())
        .unwrap();

    let request = registry.take_by_serial(7).unwrap();
    assert_eq!(
        registry.take_by_serial(7).unwrap_err(),
        RegistryError::NotFound(7)
    );
    request.complete(Ok(Response::Void));

    assert_eq!(rx.try_recv().unwrap(), Ok(Response::Void));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_register_twice_is_duplicate() {
    let registry = RequestRegistry::new();
    let (a, _a_rx) = Completion::channel();
    let (b, _b_rx) = Completion::channel();
    registry.register(7, RequestCode::DIAL, a, Vec::new()).unwrap();
    assert_eq!(
        registry.register(7, RequestCode::DIAL, b, Vec::new()),
        Err(RegistryError::DuplicateSerial(7))
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_serial_reusable_after_take() {
    let registry = RequestRegistry::new();
    let (a, _a_rx) = Completion::channel();
    let (b, _b_rx) = Completion::channel();
    registry.register(7, RequestCode::DIAL, a, Vec::new()).unwrap();
    registry.take_by_serial(7).unwrap().complete(Ok(Response::Void));
    registry
        .register(7, RequestCode::HANGUP, b, Vec::new())
        .unwrap();
    assert_eq!(registry.peek_code(7), Some(RequestCode::HANGUP));
}

#[test]
fn test_concurrent_takes_for_one_serial() {
    const THREADS: usize = 8;

    for _ in 0..50 {
        let registry = Arc::new(RequestRegistry::new());
        let completions = Arc::new(AtomicUsize::new(0));
        let c = completions.clone();
        registry
            .register(
                1,
                RequestCode::OPERATOR,
                Completion::new(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                }),
                Vec::new(),
            )
            .unwrap();

        let barrier = Arc::new(Barrier::new(THREADS));
        let winners = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = registry.clone();
                let barrier = barrier.clone();
                let winners = winners.clone();
                thread::spawn(move || {
                    barrier.wait();
                    if let Ok(request) = registry.take_by_serial(1) {
                        winners.fetch_add(1, Ordering::SeqCst);
                        request.complete(Ok(Response::Void));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_concurrent_register_and_take_different_serials() {
    const PER_THREAD: i32 = 200;
    const THREADS: i32 = 4;

    let registry = Arc::new(RequestRegistry::new());
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let registry = registry.clone();
            let completed = completed.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let serial = t * PER_THREAD + i;
                    let c = completed.clone();
                    registry
                        .register(
                            serial,
                            RequestCode::SIGNAL_STRENGTH,
                            Completion::new(move |_| {
                                c.fetch_add(1, Ordering::SeqCst);
                            }),
                            Vec::new(),
                        )
                        .unwrap();
                    if i % 2 == 0 {
                        registry
                            .take_by_serial(serial)
                            .unwrap()
                            .complete(Ok(Response::Void));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let remaining = (THREADS * PER_THREAD / 2) as usize;
    assert_eq!(registry.len(), remaining);
    assert_eq!(registry.cancel_all("test over"), remaining);
    assert_eq!(
        completed.load(Ordering::SeqCst),
        (THREADS * PER_THREAD) as usize
    );
}
