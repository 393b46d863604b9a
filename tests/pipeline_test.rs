use async_trait::async_trait;
use exam_wizard::{
    BackendError, GenerationBackend, InputParameters, PipelineController, PipelineError,
    ResultSet, Stage, Step,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// 可编排的测试后端
///
/// - 记录每次调用的阶段和上下文
/// - 按队列返回预设结果，队列为空时返回阶段名
/// - 设置闸门后每次调用都要等待一次 `notify_one`
#[derive(Default)]
struct ScriptedBackend {
    calls: Mutex<Vec<(Stage, ResultSet)>>,
    responses: Mutex<VecDeque<Result<String, String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self::default()
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn respond(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
    }

    fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    fn calls(&self) -> Vec<(Stage, ResultSet)> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        stage: Stage,
        _params: &InputParameters,
        context: &ResultSet,
    ) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push((stage, context.clone()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(BackendError::new(message)),
            None => Ok(stage.tag().to_string()),
        }
    }
}

fn controller() -> PipelineController<Arc<ScriptedBackend>> {
    controller_with(Arc::new(ScriptedBackend::new())).0
}

fn controller_with(
    backend: Arc<ScriptedBackend>,
) -> (PipelineController<Arc<ScriptedBackend>>, Arc<ScriptedBackend>) {
    (
        PipelineController::new(backend.clone(), InputParameters::default()),
        backend,
    )
}

fn results(entries: &[(Stage, &str)]) -> ResultSet {
    let mut set = ResultSet::new();
    for (stage, text) in entries {
        set.set(*stage, *text);
    }
    set
}

/// 从表单一路生成到最后一个阶段
async fn run_to_end(controller: &PipelineController<Arc<ScriptedBackend>>) {
    controller.start(InputParameters::default()).await.unwrap();
    while controller.current_step() != Step::Stage(Stage::LAST) {
        controller.advance().await.unwrap();
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    backend.respond("M");
    backend.respond("S");
    backend.respond("M2");

    let matrix = controller.start(InputParameters::default()).await.unwrap();
    assert_eq!(matrix, "M");
    assert_eq!(controller.current_step(), Step::Stage(Stage::Matrix));

    assert_eq!(controller.advance().await.unwrap(), Stage::Specification);
    assert_eq!(
        controller.results(),
        results(&[(Stage::Matrix, "M"), (Stage::Specification, "S")])
    );

    assert_eq!(controller.regress().unwrap(), Stage::Matrix);
    assert_eq!(
        controller.results(),
        results(&[(Stage::Matrix, "M"), (Stage::Specification, "S")])
    );

    assert_eq!(controller.regenerate().await.unwrap(), "M2");
    assert_eq!(controller.results(), results(&[(Stage::Matrix, "M2")]));

    assert_eq!(
        backend.calls(),
        vec![
            (Stage::Matrix, ResultSet::new()),
            (Stage::Specification, results(&[(Stage::Matrix, "M")])),
            (Stage::Matrix, ResultSet::new()),
        ]
    );
}

#[tokio::test]
async fn test_context_holds_only_earlier_stages() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    run_to_end(&controller).await;

    // 手动修改的后续阶段不会出现在前面阶段的上下文中
    controller.regress().unwrap();
    controller.regress().unwrap();
    controller.edit_output(Stage::AnswerSupplement, "edited");
    controller.regenerate().await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), Stage::ALL.len() + 1);
    for (stage, context) in calls {
        assert_eq!(context.stages(), stage.predecessors().to_vec());
    }
}

#[tokio::test]
async fn test_never_generates_with_missing_predecessor() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    controller.start(InputParameters::default()).await.unwrap();
    controller.advance().await.unwrap();

    // specification 重新生成失败后为空，exam 的前置条件不满足
    backend.fail("timeout");
    assert!(controller.regenerate().await.is_err());
    assert_eq!(controller.results(), results(&[(Stage::Matrix, "matrix")]));

    let calls_before = backend.call_count();
    assert_eq!(
        controller.advance().await,
        Err(PipelineError::MissingPrerequisite {
            stage: Stage::Specification
        })
    );
    assert_eq!(backend.call_count(), calls_before);
    assert_eq!(controller.current_step(), Step::Stage(Stage::Specification));

    for (stage, context) in backend.calls() {
        for prior in stage.predecessors() {
            assert!(context.contains(*prior), "{} 缺少前置 {}", stage, prior);
        }
    }
}

#[tokio::test]
async fn test_regenerate_invalidates_downstream() {
    let controller = controller();
    run_to_end(&controller).await;

    controller.regress().unwrap();
    controller.regress().unwrap();
    assert_eq!(controller.current_step(), Step::Stage(Stage::Exam));

    controller.regenerate().await.unwrap();

    let after = controller.results();
    assert_eq!(after.get(Stage::Matrix), Some("matrix"));
    assert_eq!(after.get(Stage::Specification), Some("specification"));
    assert_eq!(after.get(Stage::Exam), Some("exam"));
    assert!(!after.contains(Stage::AnswerKey));
    assert!(!after.contains(Stage::AnswerSupplement));

    // 后续阶段要等 advance 时重新生成
    controller.advance().await.unwrap();
    assert!(controller.results().contains(Stage::AnswerKey));
    assert!(!controller.results().contains(Stage::AnswerSupplement));
}

#[tokio::test]
async fn test_only_one_generation_in_flight() {
    let gate = Arc::new(Notify::new());
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::gated(gate.clone())));

    gate.notify_one();
    controller.start(InputParameters::default()).await.unwrap();
    assert_eq!(backend.call_count(), 1);

    let (first, second) = tokio::join!(controller.advance(), async {
        while !controller.is_loading() {
            tokio::task::yield_now().await;
        }
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.loading_stage, Some(Stage::Specification));

        let second = controller.advance().await;
        assert_eq!(controller.regress(), Err(PipelineError::Busy {
            stage: Stage::Specification
        }));
        gate.notify_one();
        second
    });

    assert_eq!(first, Ok(Stage::Specification));
    assert_eq!(
        second,
        Err(PipelineError::Busy {
            stage: Stage::Specification
        })
    );
    assert_eq!(backend.call_count(), 2);
    assert!(!controller.is_loading());
}

#[tokio::test]
async fn test_dropped_generation_clears_loading() {
    let gate = Arc::new(Notify::new());
    let (controller, _backend) = controller_with(Arc::new(ScriptedBackend::gated(gate.clone())));

    let outcome =
        tokio::time::timeout(Duration::from_millis(20), controller.start(InputParameters::default()))
            .await;
    assert!(outcome.is_err());

    assert!(!controller.is_loading());
    assert!(controller.results().is_empty());

    gate.notify_one();
    assert!(controller.start(InputParameters::default()).await.is_ok());
}

#[tokio::test]
async fn test_edit_overrides_without_side_effects() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    run_to_end(&controller).await;
    let before = controller.results();
    let calls = backend.call_count();

    controller.edit_output(Stage::Exam, "X");

    let after = controller.results();
    assert_eq!(after.get(Stage::Exam), Some("X"));
    for stage in Stage::ALL.into_iter().filter(|s| *s != Stage::Exam) {
        assert_eq!(after.get(stage), before.get(stage));
    }
    assert_eq!(backend.call_count(), calls);
    assert_eq!(controller.current_step(), Step::Stage(Stage::LAST));
}

#[tokio::test]
async fn test_edit_keeps_empty_text_distinct_from_missing() {
    let controller = controller();
    controller.edit_output(Stage::Matrix, "");

    assert!(controller.results().contains(Stage::Matrix));
    assert_eq!(controller.output(Stage::Matrix).as_deref(), Some(""));
    assert_eq!(controller.current_step(), Step::Form);
}

#[tokio::test]
async fn test_advance_reuses_existing_outputs() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    controller.start(InputParameters::default()).await.unwrap();
    controller.advance().await.unwrap();
    controller.advance().await.unwrap();
    controller.regress().unwrap();
    controller.regress().unwrap();
    let calls = backend.call_count();

    assert_eq!(controller.advance().await.unwrap(), Stage::Specification);
    assert_eq!(controller.advance().await.unwrap(), Stage::Exam);

    assert_eq!(backend.call_count(), calls);
    assert_eq!(controller.current_step(), Step::Stage(Stage::Exam));
}

#[tokio::test]
async fn test_start_resets_cleanly() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    run_to_end(&controller).await;
    assert!(controller.snapshot().is_complete());

    let new_params = InputParameters {
        grade: "Lớp 8".to_string(),
        ..InputParameters::default()
    };
    backend.fail("quota exceeded");
    assert!(controller.start(new_params.clone()).await.is_err());

    assert!(controller.results().is_empty());
    assert_eq!(controller.current_step(), Step::Stage(Stage::Matrix));
    assert_eq!(controller.params(), new_params);
}

#[tokio::test]
async fn test_failure_is_reported_verbatim() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    backend.fail("503 Service Unavailable");

    let err = controller
        .start(InputParameters::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::Generation(BackendError::new("503 Service Unavailable"))
    );
    assert_eq!(err.to_string(), "503 Service Unavailable");
    assert_eq!(
        controller.last_error().as_deref(),
        Some("503 Service Unavailable")
    );
    assert!(!controller.is_loading());
    assert!(controller.results().is_empty());

    // 重试会清除错误
    controller.start(InputParameters::default()).await.unwrap();
    assert_eq!(controller.last_error(), None);
    assert_eq!(controller.output(Stage::Matrix).as_deref(), Some("matrix"));
}

#[tokio::test]
async fn test_failed_advance_stays_on_current_stage() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    controller.start(InputParameters::default()).await.unwrap();

    backend.fail("rate limited");
    assert!(controller.advance().await.is_err());

    assert_eq!(controller.current_step(), Step::Stage(Stage::Matrix));
    assert!(!controller.results().contains(Stage::Specification));
    assert_eq!(controller.last_error().as_deref(), Some("rate limited"));
}

#[tokio::test]
async fn test_invalid_transitions() {
    let controller = controller();

    assert_eq!(
        controller.advance().await,
        Err(PipelineError::InvalidTransition {
            action: "advance",
            from: Step::Form
        })
    );
    assert!(matches!(
        controller.regress(),
        Err(PipelineError::InvalidTransition { .. })
    ));
    assert!(matches!(
        controller.regenerate().await,
        Err(PipelineError::InvalidTransition { .. })
    ));

    controller.start(InputParameters::default()).await.unwrap();
    assert!(matches!(
        controller.regress(),
        Err(PipelineError::InvalidTransition { .. })
    ));

    run_to_end(&controller).await;
    assert!(matches!(
        controller.advance().await,
        Err(PipelineError::InvalidTransition { .. })
    ));
    assert_eq!(controller.current_step(), Step::Stage(Stage::LAST));
}

#[tokio::test]
async fn test_start_over_keeps_params() {
    let controller = controller();
    let params = InputParameters {
        subject: "Toán".to_string(),
        ..InputParameters::default()
    };
    controller.start(params.clone()).await.unwrap();
    controller.advance().await.unwrap();

    controller.start_over().unwrap();

    assert_eq!(controller.current_step(), Step::Form);
    assert!(controller.results().is_empty());
    assert_eq!(controller.params(), params);
}

#[tokio::test]
async fn test_set_params_keeps_results() {
    let controller = controller();
    controller.start(InputParameters::default()).await.unwrap();

    let params = InputParameters {
        duration: 90,
        ..InputParameters::default()
    };
    controller.set_params(params.clone());

    assert_eq!(controller.params(), params);
    assert_eq!(controller.output(Stage::Matrix).as_deref(), Some("matrix"));
}

#[tokio::test]
async fn test_subscribers_see_changes() {
    let controller = controller();
    let mut rx = controller.subscribe();
    assert!(!rx.has_changed().unwrap());

    controller.start(InputParameters::default()).await.unwrap();
    assert!(rx.has_changed().unwrap());

    let state = rx.borrow_and_update().clone();
    assert_eq!(state.run.current_step, Step::Stage(Stage::Matrix));
    assert!(!state.run.is_loading);

    controller.edit_output(Stage::Matrix, "M");
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow().run.results.get(Stage::Matrix), Some("M"));
}

#[tokio::test]
async fn test_edit_keeps_error_and_start_over_clears_it() {
    let (controller, backend) = controller_with(Arc::new(ScriptedBackend::new()));
    controller.start(InputParameters::default()).await.unwrap();

    backend.fail("x");
    assert!(controller.advance().await.is_err());
    assert_eq!(controller.last_error().as_deref(), Some("x"));

    controller.edit_output(Stage::Specification, "S");
    assert_eq!(controller.last_error().as_deref(), Some("x"));
    assert_eq!(controller.snapshot().current_output(), Some("matrix"));

    controller.start_over().unwrap();
    assert_eq!(controller.last_error(), None);
    assert!(!controller.is_loading());
    assert_eq!(controller.current_step(), Step::Form);
}
