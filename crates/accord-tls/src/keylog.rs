//! Key-material log dispatch (SSLKEYLOGFILE style).
//!
//! One dispatcher is shared across every handshake attempt built by
//! the same authority, so `log` must be callable from any number of
//! threads at once. The dispatcher holds no lock at all: the sink is
//! an immutable `Arc`, each call forwards straight into it, and two
//! overlapping calls never wait on each other. A sink that blocks only
//! blocks its own caller.

use crate::config::callback::{KeyLogCallback, KeyLogFn};

/// Convert bytes to lowercase hex.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Thread-safe forwarder from handshake attempts to a key-log sink.
#[derive(Clone)]
pub struct KeyLogDispatcher {
    sink: KeyLogFn,
}

impl KeyLogDispatcher {
    pub fn new(sink: KeyLogFn) -> Self {
        Self { sink }
    }

    /// Build a dispatcher around a configuration's key-log callback.
    pub fn from_callback(callback: &KeyLogCallback) -> Self {
        Self {
            sink: callback.sink(),
        }
    }

    /// Forward one message to the sink, unmodified, exactly once.
    pub fn log(&self, message: &str) {
        (self.sink)(message);
    }

    /// Log one NSS key log line: `<label> <client_random_hex> <secret_hex>`.
    pub fn log_key(&self, label: &str, client_random: &[u8; 32], secret: &[u8]) {
        let line = format!("{} {} {}", label, to_hex(client_random), to_hex(secret));
        self.log(&line);
    }
}

impl std::fmt::Debug for KeyLogDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyLogDispatcher(<sink>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x01, 0xab, 0xff]), "01abff");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_log_forwards_unmodified() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let dispatcher = KeyLogDispatcher::new(Arc::new(move |line| {
            captured.lock().unwrap().push(line.to_string());
        }));
        dispatcher.log("EXACT message  with  spacing");
        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["EXACT message  with  spacing"]
        );
    }

    #[test]
    fn test_log_key_nss_format() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let dispatcher = KeyLogDispatcher::new(Arc::new(move |line| {
            captured.lock().unwrap().push(line.to_string());
        }));
        dispatcher.log_key("CLIENT_RANDOM", &[0x42; 32], &[0xab, 0xcd]);
        let logged = lines.lock().unwrap();
        let parts: Vec<&str> = logged[0].split(' ').collect();
        assert_eq!(parts[0], "CLIENT_RANDOM");
        assert_eq!(parts[1], "42".repeat(32));
        assert_eq!(parts[2], "abcd");
    }

    #[test]
    fn test_concurrent_slow_logs_do_not_serialize() {
        // Both sink invocations must be inside the sink at the same
        // time: each signals entry, then blocks until the test thread
        // releases all three parties. A dispatcher that held a lock
        // across the sink would never get the second entry signal.
        let (entered_tx, entered_rx) = mpsc::channel::<&'static str>();
        let release = Arc::new(Barrier::new(3));
        let delivered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let sink_release = release.clone();
        let sink_delivered = delivered.clone();
        let dispatcher = KeyLogDispatcher::new(Arc::new(move |line: &str| {
            entered_tx
                .send(if line.contains("alpha") { "alpha" } else { "beta" })
                .unwrap();
            sink_release.wait();
            sink_delivered.lock().unwrap().push(line.to_string());
        }));

        let d1 = dispatcher.clone();
        let t1 = thread::spawn(move || d1.log("secret-alpha"));
        let d2 = dispatcher.clone();
        let t2 = thread::spawn(move || d2.log("secret-beta"));

        // Both calls entered the sink concurrently.
        let first = entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let second = entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_ne!(first, second);

        release.wait();
        t1.join().unwrap();
        t2.join().unwrap();

        let mut messages = delivered.lock().unwrap().clone();
        messages.sort();
        assert_eq!(messages, ["secret-alpha", "secret-beta"]);
    }

    #[test]
    fn test_each_call_delivered_exactly_once() {
        let count = Arc::new(Mutex::new(0u32));
        let counter = count.clone();
        let dispatcher = KeyLogDispatcher::new(Arc::new(move |_| {
            *counter.lock().unwrap() += 1;
        }));
        for _ in 0..10 {
            dispatcher.log("line");
        }
        assert_eq!(*count.lock().unwrap(), 10);
    }

    #[test]
    fn test_from_callback_shares_sink() {
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let callback = KeyLogCallback::new(Arc::new(move |line| {
            captured.lock().unwrap().push(line.to_string());
        }));
        let dispatcher = KeyLogDispatcher::from_callback(&callback);
        dispatcher.log("via dispatcher");
        callback.call("via callback");
        assert_eq!(
            lines.lock().unwrap().as_slice(),
            ["via dispatcher", "via callback"]
        );
    }
}
