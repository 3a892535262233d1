//! Trial-division primes and the background prime worker
//!
//! The worker speaks a one-way streaming protocol: a request carries the
//! number of primes wanted, and every discovered prime comes back as its own
//! message, in ascending order. There is no backpressure; the worker stops
//! once its handle (and with it the result receiver) is dropped.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{Builder, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

/// Trial division primality test
///
/// Only divisors from 2 upwards are tried, so 1 passes.
pub fn is_prime(number: u64) -> bool {
    if number == 0 {
        return false;
    }

    let mut divisor = 2;
    while divisor * divisor <= number {
        if number % divisor == 0 {
            return false;
        }
        divisor += 1;
    }

    true
}

/// Iterator over primes in ascending order
///
/// Candidates are 1, 2, 3 and then every odd number.
#[derive(Debug, Clone)]
pub struct Primes {
    cursor: u64,
}

impl Primes {
    pub fn new() -> Self {
        Self { cursor: 1 }
    }
}

impl Default for Primes {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            let candidate = self.cursor;
            self.cursor += if candidate > 2 { 2 } else { 1 };
            if is_prime(candidate) {
                return Some(candidate);
            }
        }
    }
}

/// Computes the first `count` primes
pub fn first_primes(count: usize) -> Vec<u64> {
    Primes::new().take(count).collect()
}

/// Handle to a background thread that streams primes
#[derive(Debug)]
pub struct PrimeWorker {
    requests: Option<Sender<usize>>,
    results: Receiver<u64>,
    thread: Option<JoinHandle<()>>,
}

impl PrimeWorker {
    /// Starts the worker thread
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = channel::<usize>();
        let (result_tx, result_rx) = channel::<u64>();

        let thread = Builder::new()
            .name("prime_worker".to_owned())
            .spawn(move || Self::serve(request_rx, result_tx))?;

        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            thread: Some(thread),
        })
    }

    /// Asks for the first `count` primes
    ///
    /// # Returns
    /// false if the worker is no longer running
    pub fn post(&self, count: usize) -> bool {
        self.requests
            .as_ref()
            .is_some_and(|requests| requests.send(count).is_ok())
    }

    /// Takes every prime delivered so far without blocking
    pub fn drain(&self) -> Vec<u64> {
        let mut primes = Vec::new();
        loop {
            match self.results.try_recv() {
                Ok(prime) => primes.push(prime),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        primes
    }

    /// Blocks until the next prime arrives
    pub fn recv(&self) -> Option<u64> {
        self.results.recv().ok()
    }

    fn serve(requests: Receiver<usize>, results: Sender<u64>) {
        for count in requests {
            let started = Instant::now();
            info!(count, "calculating primes");

            for prime in Primes::new().take(count) {
                if results.send(prime).is_err() {
                    debug!("result receiver gone, stopping prime worker");
                    return;
                }
            }

            info!(
                count,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "prime calculation finished"
            );
        }
    }
}

impl Drop for PrimeWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the serve loop once it is idle
        self.requests.take();
        if let Some(thread) = self.thread.take().filter(|thread| thread.is_finished()) {
            if thread.join().is_err() {
                warn!("prime worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        assert!(!is_prime(0));
        assert!(is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(97));
        assert!(!is_prime(91)); // 7 * 13
    }

    #[test]
    fn first_ten_primes() {
        assert_eq!(first_primes(10), vec![1, 2, 3, 5, 7, 11, 13, 17, 19, 23]);
    }

    #[test]
    fn zero_primes() {
        assert!(first_primes(0).is_empty());
    }

    #[test]
    fn two_thousandth_prime() {
        let primes = first_primes(2000);
        assert_eq!(primes.len(), 2000);
        assert_eq!(primes.first(), Some(&1));
        assert_eq!(primes.last(), Some(&17387));
    }

    #[test]
    fn worker_streams_in_ascending_order() {
        let worker = PrimeWorker::spawn().unwrap();
        assert!(worker.post(25));

        let received: Vec<u64> = (0..25).filter_map(|_| worker.recv()).collect();

        assert_eq!(received, first_primes(25));
        assert!(received.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn worker_serves_multiple_requests() {
        let worker = PrimeWorker::spawn().unwrap();
        assert!(worker.post(3));
        assert!(worker.post(2));

        let received: Vec<u64> = (0..5).filter_map(|_| worker.recv()).collect();

        assert_eq!(received, vec![1, 2, 3, 1, 2]);
    }
}
