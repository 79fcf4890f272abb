use super::*;
use std::sync::Mutex;

use crate::batch::archive_file_name;
use crate::params::GenerationConfig;
use crate::segment::Segment;

fn job(timestamp: u64) -> BatchJob {
    let segments = ["a", "b"]
        .iter()
        .enumerate()
        .map(|(index, t)| Segment {
            index,
            text: (*t).to_owned(),
        })
        .collect();
    BatchJob::new(segments, GenerationConfig::with_font("default"), timestamp)
}

fn archive_for(job: &BatchJob) -> Delivery {
    Delivery::Archive {
        file_name: archive_file_name(job.timestamp),
        zip: Vec::new(),
        failures: Vec::new(),
    }
}

#[test]
fn jobs_run_in_submission_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_worker = Arc::clone(&seen);
    let queue = JobQueue::spawn(8, move |job, _| {
        seen_in_worker.lock().unwrap().push(job.timestamp);
        Ok(archive_for(job))
    })
    .unwrap();

    let tickets: Vec<JobTicket> = (1..=3).map(|ts| queue.submit(job(ts)).unwrap()).collect();
    let names: Vec<String> = tickets
        .into_iter()
        .map(|t| t.wait().unwrap().file_name().to_owned())
        .collect();

    assert_eq!(names, ["1_texttool.zip", "2_texttool.zip", "3_texttool.zip"]);
    assert_eq!(*seen.lock().unwrap(), [1, 2, 3]);
    assert!(queue.is_empty());
}

#[test]
fn full_queue_rejects_with_limit() {
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let queue = JobQueue::spawn(2, move |job, _| {
        let _ = gate_rx.recv();
        Ok(archive_for(job))
    })
    .unwrap();

    let first = queue.submit(job(1)).unwrap();
    let second = queue.submit(job(2)).unwrap();
    assert_eq!(first.position(), 1);
    assert_eq!(second.position(), 2);
    assert_eq!(queue.len(), 2);

    let err = queue.submit(job(3)).unwrap_err();
    assert!(matches!(err, TextToolError::Limit(_)), "{err}");

    gate_tx.send(()).unwrap();
    gate_tx.send(()).unwrap();
    first.wait().unwrap();
    second.wait().unwrap();
    assert_eq!(queue.len(), 0);

    gate_tx.send(()).unwrap();
    queue.submit(job(4)).unwrap().wait().unwrap();
}

#[test]
fn cancelled_ticket_never_runs() {
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let runs = Arc::new(AtomicUsize::new(0));
    let runs_in_worker = Arc::clone(&runs);
    let queue = JobQueue::spawn(4, move |job, _| {
        let _ = gate_rx.recv();
        runs_in_worker.fetch_add(1, Ordering::SeqCst);
        Ok(archive_for(job))
    })
    .unwrap();

    let first = queue.submit(job(1)).unwrap();
    let second = queue.submit(job(2)).unwrap();
    second.cancel();
    gate_tx.send(()).unwrap();

    first.wait().unwrap();
    assert!(matches!(second.wait(), Err(TextToolError::Cancelled)));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn wait_timeout_cancels_the_job() {
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let queue = JobQueue::spawn(1, move |_, cancel: &CancelToken| {
        let _ = gate_rx.recv();
        if cancel.is_cancelled() {
            Err(TextToolError::Cancelled)
        } else {
            Err(TextToolError::render("should have been cancelled"))
        }
    })
    .unwrap();

    let ticket = queue.submit(job(1)).unwrap();
    let err = ticket.wait_timeout(Duration::from_millis(20)).unwrap_err();
    assert!(matches!(err, TextToolError::Timeout { .. }));

    drop(gate_tx);
    drop(queue);
}

#[test]
fn zero_capacity_is_config_error() {
    let err = JobQueue::spawn(0, |job, _| Ok(archive_for(job)))
        .err()
        .unwrap();
    assert!(matches!(err, TextToolError::Config(_)));
}
