//! The submission pipeline: parse lines, fan out one task per entry, fan the
//! results back in.
//!
//! The accounting invariant lives here: a task is counted at the moment it is
//! spawned, lines that fail to parse are never counted, and every spawned
//! task publishes exactly one result. The drain therefore sees exactly
//! `launched` results: one receive short deadlocks, one long loses a result.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{Semaphore, mpsc};

use oplog_api::{ApiError, Client, SubmissionResponse};
use oplog_core::{ActivityRules, SpentDate, TimeEntryPayload, parse_line};

/// Counters for one run over an input file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// Tasks spawned, one per successfully parsed line.
    pub launched: usize,
    /// Lines dropped before spawning (parse or serialization failure).
    pub skipped: usize,
    /// Results drained from the completion channel; always equals `launched`.
    pub received: usize,
    /// Submissions that got an HTTP response, whatever the status.
    pub succeeded: usize,
    /// Submissions that failed at the transport level.
    pub failed: usize,
}

/// One task's report back to the coordinator.
struct TaskResult {
    line_no: usize,
    work_package: i64,
    result: Result<SubmissionResponse, ApiError>,
}

/// Reads the input to the end, submits every parseable line, and drains
/// exactly as many results as tasks were spawned.
///
/// Per-line failures are logged and skipped; transport failures are logged
/// and counted. Neither stops the run. Only an unreadable input line is
/// fatal.
pub async fn run(
    input: impl BufRead,
    date: SpentDate,
    rules: &ActivityRules,
    client: &Client,
    max_in_flight: usize,
) -> Result<PushOutcome> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TaskResult>();
    let semaphore = Arc::new(Semaphore::new(max_in_flight));
    let mut outcome = PushOutcome::default();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("failed to read input line {line_no}"))?;

        let entry = match parse_line(&line) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(line = line_no, %err, "skipping line");
                outcome.skipped += 1;
                continue;
            }
        };

        let activity_code = rules.classify(entry.work_package);
        let payload = TimeEntryPayload::new(&entry, activity_code, &date);
        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(line = line_no, %err, "skipping line, cannot serialize payload");
                outcome.skipped += 1;
                continue;
            }
        };

        // Counted at spawn: parse failures above never reach this point.
        outcome.launched += 1;
        let tx = tx.clone();
        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        let work_package = entry.work_package;
        tokio::spawn(async move {
            // The semaphore bounds in-flight requests; it is never closed,
            // so acquisition cannot fail.
            let _permit = semaphore.acquire_owned().await.ok();
            let result = client.submit(body).await;
            // Exactly one send per task, success or not. The receiver only
            // disappears early on a fatal read error, in which case the
            // result is dropped along with the run.
            let _ = tx.send(TaskResult {
                line_no,
                work_package,
                result,
            });
        });
    }

    // With the coordinator's sender gone, the channel closes once every
    // spawned task has sent: the loop below receives exactly `launched`
    // results, in completion order.
    drop(tx);
    while let Some(task) = rx.recv().await {
        outcome.received += 1;
        match task.result {
            Ok(response) => {
                outcome.succeeded += 1;
                println!("{} {}", response.status, response.body);
            }
            Err(err) => {
                outcome.failed += 1;
                tracing::error!(
                    line = task.line_no,
                    work_package = task.work_package,
                    %err,
                    "submission failed"
                );
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    fn rules() -> ActivityRules {
        ActivityRules {
            default: 1,
            meeting: 6,
            meeting_wps: [42].into_iter().collect(),
        }
    }

    fn date() -> SpentDate {
        SpentDate::parse("20210921").unwrap()
    }

    /// Serves `count` HTTP responses on a loopback socket, one connection
    /// each, and returns the captured request bodies.
    fn serve(count: usize, status_line: &'static str) -> (String, thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let mut bodies = Vec::new();
            for _ in 0..count {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).unwrap();
                    if line.trim().is_empty() {
                        break;
                    }
                    if let Some(value) =
                        line.to_ascii_lowercase().strip_prefix("content-length:")
                    {
                        content_length = value.trim().parse().unwrap();
                    }
                }

                let mut body = vec![0; content_length];
                reader.read_exact(&mut body).unwrap();
                bodies.push(String::from_utf8(body).unwrap());

                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok"
                );
                let mut stream = stream;
                stream.write_all(response.as_bytes()).unwrap();
            }
            bodies
        });

        (url, handle)
    }

    #[tokio::test]
    async fn launches_and_receives_exactly_one_result_per_valid_line() {
        // 5 lines, 2 malformed: exactly 3 tasks, exactly 3 results.
        let input = "\
123 4.00 code review
not-a-number 2.00 triage
42 1.00 weekly sync
456 0.50
789 0.25 standup notes
";
        let (url, server) = serve(3, "201 Created");
        let client = Client::new(url, "secret").unwrap();

        let outcome = run(input.as_bytes(), date(), &rules(), &client, 8)
            .await
            .unwrap();

        assert_eq!(outcome.launched, 3);
        assert_eq!(outcome.received, 3);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.succeeded, 3);
        assert_eq!(outcome.failed, 0);

        let bodies = server.join().unwrap();
        assert_eq!(bodies.len(), 3);
        // The meeting work package got the meeting activity code.
        assert!(
            bodies
                .iter()
                .any(|b| b.contains("/api/v3/time_entries/activities/6")
                    && b.contains("/api/v3/work_packages/42"))
        );
    }

    #[tokio::test]
    async fn empty_input_terminates_without_receiving() {
        let client = Client::new("http://127.0.0.1:1", "secret").unwrap();
        let outcome = run(&b""[..], date(), &rules(), &client, 8).await.unwrap();
        assert_eq!(outcome, PushOutcome::default());
    }

    #[tokio::test]
    async fn all_malformed_input_launches_nothing() {
        let input = "\n\nnope\n1.5 too short\n";
        let client = Client::new("http://127.0.0.1:1", "secret").unwrap();
        let outcome = run(input.as_bytes(), date(), &rules(), &client, 8)
            .await
            .unwrap();
        assert_eq!(outcome.launched, 0);
        assert_eq!(outcome.received, 0);
        assert_eq!(outcome.skipped, 4);
    }

    #[tokio::test]
    async fn transport_failures_are_counted_without_stopping_the_run() {
        // One working server response, then submissions against a dead port.
        let input = "123 1.00 first\n456 2.00 second\n";
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let dead_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = Client::new(dead_url, "secret").unwrap();
        let outcome = run(input.as_bytes(), date(), &rules(), &client, 8)
            .await
            .unwrap();

        assert_eq!(outcome.launched, 2);
        assert_eq!(outcome.received, 2);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.succeeded, 0);
    }

    #[tokio::test]
    async fn non_2xx_responses_count_as_received_successes() {
        let input = "123 1.00 rejected entry\n";
        let (url, server) = serve(1, "422 Unprocessable Entity");
        let client = Client::new(url, "secret").unwrap();

        let outcome = run(input.as_bytes(), date(), &rules(), &client, 8)
            .await
            .unwrap();
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 0);
        server.join().unwrap();
    }

    /// The semaphore caps simultaneous connections. The server tracks the
    /// high-water mark of concurrently open sockets.
    #[tokio::test]
    async fn in_flight_submissions_are_bounded() {
        static OPEN: AtomicUsize = AtomicUsize::new(0);
        static PEAK: AtomicUsize = AtomicUsize::new(0);

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let server = thread::spawn(move || {
            let mut workers = Vec::new();
            for _ in 0..6 {
                let (stream, _) = listener.accept().unwrap();
                workers.push(thread::spawn(move || {
                    let open = OPEN.fetch_add(1, Ordering::SeqCst) + 1;
                    PEAK.fetch_max(open, Ordering::SeqCst);

                    let mut reader = BufReader::new(stream.try_clone().unwrap());
                    let mut content_length = 0;
                    loop {
                        let mut line = String::new();
                        reader.read_line(&mut line).unwrap();
                        if line.trim().is_empty() {
                            break;
                        }
                        if let Some(value) =
                            line.to_ascii_lowercase().strip_prefix("content-length:")
                        {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                    let mut body = vec![0; content_length];
                    reader.read_exact(&mut body).unwrap();

                    // Hold the connection open long enough for an unbounded
                    // client to have opened all six at once.
                    thread::sleep(std::time::Duration::from_millis(100));

                    let mut stream = stream;
                    stream
                        .write_all(
                            b"HTTP/1.1 201 Created\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                        )
                        .unwrap();
                    OPEN.fetch_sub(1, Ordering::SeqCst);
                }));
            }
            for worker in workers {
                worker.join().unwrap();
            }
        });

        let input = "\
1 1.00 a
2 1.00 b
3 1.00 c
4 1.00 d
5 1.00 e
6 1.00 f
";
        let client = Client::new(url, "secret").unwrap();
        let outcome = run(input.as_bytes(), date(), &rules(), &client, 2)
            .await
            .unwrap();

        assert_eq!(outcome.launched, 6);
        assert_eq!(outcome.received, 6);
        server.join().unwrap();
        assert!(
            PEAK.load(Ordering::SeqCst) <= 2,
            "expected at most 2 concurrent requests, saw {}",
            PEAK.load(Ordering::SeqCst)
        );
    }
}
