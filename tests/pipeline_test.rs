//! Pipeline executor: strict order, fail-fast, progress reporting.

use async_trait::async_trait;
use eks_bootstrap::error::{ProvisionError, Result};
use eks_bootstrap::pipeline::{run_pipeline, Step};
use eks_bootstrap::progress::ProgressReporter;
use eks_bootstrap::ProvisionContext;
use std::sync::{Arc, Mutex};

struct RecordingStep {
    name: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    fail: bool,
}

#[async_trait]
impl Step for RecordingStep {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, _ctx: &mut ProvisionContext) -> Result<()> {
        self.log.lock().unwrap().push(self.name);
        if self.fail {
            Err(ProvisionError::Runtime(format!("{} exploded", self.name)))
        } else {
            Ok(())
        }
    }
}

struct CollectingReporter {
    events: Mutex<Vec<(u32, String)>>,
}

impl ProgressReporter for CollectingReporter {
    fn emit(&self, percentage: u32, message: String) {
        self.events.lock().unwrap().push((percentage, message));
    }
}

fn step(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, fail: bool) -> Box<dyn Step> {
    Box::new(RecordingStep {
        name,
        log: Arc::clone(log),
        fail,
    })
}

#[tokio::test]
async fn steps_run_in_declared_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let steps = vec![
        step("one", &log, false),
        step("two", &log, false),
        step("three", &log, false),
    ];

    let mut ctx = ProvisionContext::new();
    let reporter = CollectingReporter {
        events: Mutex::new(Vec::new()),
    };
    run_pipeline(&steps, &mut ctx, &reporter).await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["one", "two", "three"]);

    let events = reporter.events.lock().unwrap();
    assert_eq!(events.first().unwrap().0, 0);
    assert_eq!(events.last().unwrap().0, 100);
}

#[tokio::test]
async fn failed_step_aborts_without_running_later_steps() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let steps = vec![
        step("one", &log, false),
        step("two", &log, true),
        step("three", &log, false),
    ];

    let mut ctx = ProvisionContext::new();
    let reporter = CollectingReporter {
        events: Mutex::new(Vec::new()),
    };
    let result = run_pipeline(&steps, &mut ctx, &reporter).await;

    assert!(result.is_err());
    assert_eq!(
        *log.lock().unwrap(),
        vec!["one", "two"],
        "step three must never execute"
    );
}

#[tokio::test]
async fn empty_pipeline_is_a_no_op() {
    let mut ctx = ProvisionContext::new();
    let reporter = CollectingReporter {
        events: Mutex::new(Vec::new()),
    };
    run_pipeline(&[], &mut ctx, &reporter).await.unwrap();
    assert!(reporter.events.lock().unwrap().is_empty());
}
