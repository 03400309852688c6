//! End-to-end pipeline tests over a loopback PUSH/PULL socket pair.
//!
//! Each test stands in for the broker with a PULL socket bound to an
//! ephemeral port, points an agent at it, runs one collection cycle, and
//! checks the frames that arrive.

use std::io::Write;
use std::time::Duration;

use tokio::time::timeout;
use zeromq::{PullSocket, Socket, SocketRecv, ZmqMessage};

use skopos::{Agent, CollectorRegistry, Forwarder};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn broker() -> (PullSocket, String) {
    let mut pull = PullSocket::new();
    let endpoint = pull
        .bind("tcp://127.0.0.1:0")
        .await
        .expect("failed to bind loopback pull socket");
    (pull, endpoint.to_string())
}

async fn recv(pull: &mut PullSocket) -> ZmqMessage {
    timeout(RECV_TIMEOUT, pull.recv())
        .await
        .expect("timed out waiting for broker message")
        .expect("broker recv failed")
}

/// All frames as strings: the delimiter stays empty, data frames have
/// their trailing NUL stripped.
fn frames(message: &ZmqMessage) -> Vec<String> {
    (0..message.len())
        .map(|i| {
            let data: &[u8] = message.get(i).unwrap().as_ref();
            let data = data.strip_suffix(&[0u8]).unwrap_or(data);
            String::from_utf8(data.to_vec()).unwrap()
        })
        .collect()
}

fn write_config(lines: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(lines.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_cycle_forwards_events_in_order() {
    let (mut pull, endpoint) = broker().await;

    // First collector emits two samples around a malformed line and then
    // fails; the second must still run afterwards.
    let config = write_config(
        "# integration fixture\n\
         echo 'SAMPLE 100 a:b:c 42'; echo 'garbage line'; echo 'SAMPLE 101 a:b:c 43'; exit 1\n\
         printf 'COUNTER 200 hits\\nEVENT 300 reboot\\n'\n",
    );

    let registry = CollectorRegistry::load(config.path()).unwrap();
    assert_eq!(registry.len(), 2);

    let forwarder = Forwarder::connect(&endpoint).await.unwrap();
    let mut agent = Agent::new(registry, forwarder, Duration::from_secs(30), true);
    agent.run_cycle().await;

    let first = recv(&mut pull).await;
    assert_eq!(frames(&first), ["", "SAMPLE", "100", "a:b:c", "42"]);

    // The malformed line was dropped; the next message is the second sample.
    let second = recv(&mut pull).await;
    assert_eq!(frames(&second), ["", "SAMPLE", "101", "a:b:c", "43"]);

    // Collector order is preserved even though the first one exited 1.
    let third = recv(&mut pull).await;
    assert_eq!(frames(&third), ["", "COUNTER", "200", "hits", "1"]);

    let fourth = recv(&mut pull).await;
    assert_eq!(frames(&fourth), ["", "EVENT", "300", "reboot", ""]);

    agent.shutdown().await;
}

#[tokio::test]
async fn test_failing_collector_does_not_block_the_cycle() {
    let (mut pull, endpoint) = broker().await;

    let config = write_config(
        "no_such_command_skopos_test\n\
         echo 'STATE 100 a:b ok all clear'\n",
    );

    let registry = CollectorRegistry::load(config.path()).unwrap();
    let forwarder = Forwarder::connect(&endpoint).await.unwrap();
    let mut agent = Agent::new(registry, forwarder, Duration::from_secs(30), false);
    agent.run_cycle().await;

    let message = recv(&mut pull).await;
    assert_eq!(
        frames(&message),
        ["", "STATE", "100", "a:b", "ok", "all clear"]
    );

    agent.shutdown().await;
}

#[tokio::test]
async fn test_silent_collectors_produce_no_messages() {
    let (mut pull, endpoint) = broker().await;

    let config = write_config("true\necho 'SAMPLE 1 done 1'\n");

    let registry = CollectorRegistry::load(config.path()).unwrap();
    let forwarder = Forwarder::connect(&endpoint).await.unwrap();
    let mut agent = Agent::new(registry, forwarder, Duration::from_secs(30), true);
    agent.run_cycle().await;

    // Only the sentinel from the second collector arrives.
    let message = recv(&mut pull).await;
    assert_eq!(frames(&message), ["", "SAMPLE", "1", "done", "1"]);

    agent.shutdown().await;
}
