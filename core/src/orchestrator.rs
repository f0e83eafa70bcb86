//! Automatic tool-calling orchestration
//!
//! [`ConversationLoop`] drives repeated request/execute/respond turns against
//! the transport until the model stops requesting calls, automatic execution
//! is off, or the remote-call budget is spent. Turns are strictly sequential:
//! a turn's request depends on the prior turn's tool results.
//!
//! In streaming mode the caller sees one continuous fragment sequence
//! spanning tool-execution turns; a turn boundary is observable as a
//! fragment group ending in function call parts. Dropping the returned
//! future or stream cancels the loop at the next await point; owned state is
//! only mutated between await points.

use crate::error::Result;
use crate::model::content::{Content, FunctionCall};
use crate::model::request::{FunctionCallingConfig, GenerationConfig};
use crate::model::response::GenerateContentResponse;
use crate::model::stream::StreamAggregator;
use crate::model::transport::{GenerateRequest, ModelTransport, ResponseStream};
use crate::tools::{FunctionCallExecutor, ToolRegistry};
use futures::StreamExt;
use std::sync::Arc;

/// Loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    /// A remote call is in flight or about to be issued
    AwaitingResponse,

    /// The latest response requested calls that are being executed
    ExecutingTools,

    /// The loop has produced its final response
    Done,
}

/// The automatic function-calling orchestrator
#[derive(Clone)]
pub struct ConversationLoop {
    transport: Arc<dyn ModelTransport>,
    registry: Arc<ToolRegistry>,
    config: FunctionCallingConfig,
}

impl ConversationLoop {
    /// Create a loop over the given transport and registry
    pub fn new(
        transport: Arc<dyn ModelTransport>,
        registry: Arc<ToolRegistry>,
        config: FunctionCallingConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            registry,
            config,
        })
    }

    /// Whether requested calls will be executed automatically
    ///
    /// Requires automatic calling to be enabled and every tool in play to
    /// carry a bound implementation; a single schema-only tool puts the whole
    /// request into manual mode.
    fn automatic(&self) -> bool {
        !self.config.disable && !self.registry.is_empty() && self.registry.all_callable()
    }

    /// Run the loop to completion, returning the final response
    ///
    /// Issues at most `maximum_remote_calls` remote calls, and therefore at
    /// most one fewer tool-executing round trips. The conversation history is
    /// owned by this invocation and appended pairwise (model content, then
    /// tool content) per executed turn.
    pub async fn run(
        &self,
        model: &str,
        contents: Vec<Content>,
        generation: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let automatic = self.automatic();
        let declarations = self.registry.declarations();
        let executor = FunctionCallExecutor::new(&self.registry);

        let mut history = contents;
        let mut transcript = if self.config.ignore_call_history {
            Vec::new()
        } else {
            history.clone()
        };
        let mut remote_calls = 0u32;
        let mut state = LoopState::AwaitingResponse;

        let mut final_response = loop {
            tracing::trace!(state = ?state, remote_calls, "issuing remote call");
            let request = GenerateRequest {
                model: model.to_string(),
                contents: history.clone(),
                tools: declarations.clone(),
                generation: generation.clone(),
            };
            let response = self.transport.generate(request).await?;
            remote_calls += 1;

            let model_content = response.candidates.first().map(|c| c.content.clone());
            let calls: Vec<FunctionCall> =
                response.function_calls().into_iter().cloned().collect();

            if !automatic || calls.is_empty() || remote_calls >= self.config.maximum_remote_calls
            {
                state = LoopState::Done;
                break response;
            }
            let Some(model_content) = model_content else {
                state = LoopState::Done;
                break response;
            };

            state = LoopState::ExecutingTools;
            tracing::debug!(state = ?state, count = calls.len(), "executing requested calls");
            let responses = executor.execute_all(&calls).await;
            let tool_content = Content::tool(responses);

            history.push(model_content.clone());
            history.push(tool_content.clone());
            if !self.config.ignore_call_history {
                transcript.push(model_content);
                transcript.push(tool_content);
            }
            state = LoopState::AwaitingResponse;
        };

        tracing::debug!(state = ?state, remote_calls, "conversation loop finished");
        if !self.config.ignore_call_history {
            final_response.call_history = transcript;
        }
        Ok(final_response)
    }

    /// Run the loop in streaming mode
    ///
    /// The returned sequence is lazy, finite and not restartable. Fragments
    /// pass through unchanged while an aggregator folds them into the merged
    /// response that drives the turn decision; when the budget allows, a new
    /// streaming call is issued for the next turn and its fragments are
    /// appended to the same sequence.
    pub fn run_stream(
        &self,
        model: String,
        contents: Vec<Content>,
        generation: Option<GenerationConfig>,
    ) -> ResponseStream {
        let this = self.clone();
        let stream = async_stream::try_stream! {
            let automatic = this.automatic();
            let declarations = this.registry.declarations();

            let mut history = contents;
            let mut remote_calls = 0u32;

            loop {
                let request = GenerateRequest {
                    model: model.clone(),
                    contents: history.clone(),
                    tools: declarations.clone(),
                    generation: generation.clone(),
                };
                let mut fragments = this.transport.generate_stream(request).await?;
                let mut aggregator = StreamAggregator::new();
                while let Some(fragment) = fragments.next().await {
                    let fragment = fragment?;
                    aggregator.absorb(&fragment);
                    yield fragment;
                }
                let merged = aggregator.finish();
                remote_calls += 1;

                let calls: Vec<FunctionCall> =
                    merged.function_calls().into_iter().cloned().collect();
                if !automatic
                    || calls.is_empty()
                    || remote_calls >= this.config.maximum_remote_calls
                {
                    break;
                }
                let Some(candidate) = merged.candidates.into_iter().next() else {
                    break;
                };

                tracing::debug!(count = calls.len(), "executing requested calls mid-stream");
                let executor = FunctionCallExecutor::new(&this.registry);
                let responses = executor.execute_all(&calls).await;
                history.push(candidate.content);
                history.push(Content::tool(responses));
            }
        };
        Box::pin(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ToolError, TransportError};
    use crate::model::content::{Part, Role};
    use crate::model::response::Candidate;
    use crate::model::transport::{ListPage, ListRequest};
    use crate::tools::{
        get_arg, DeclaredFunction, FunctionDeclaration, FunctionTool, SchemaBuilder, Tool,
        ToolArgs,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted transport: pops one entry per generate call.
    struct MockTransport {
        responses: Mutex<VecDeque<Result<GenerateContentResponse>>>,
        streams: Mutex<VecDeque<Vec<GenerateContentResponse>>>,
        generate_calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(responses: Vec<Result<GenerateContentResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                streams: Mutex::new(VecDeque::new()),
                generate_calls: AtomicUsize::new(0),
            }
        }

        fn with_streams(streams: Vec<Vec<GenerateContentResponse>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                streams: Mutex::new(streams.into_iter().collect()),
                generate_calls: AtomicUsize::new(0),
            }
        }

        fn calls_made(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelTransport for MockTransport {
        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateContentResponse> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(text_response("out of script")))
        }

        async fn generate_stream(&self, _request: GenerateRequest) -> Result<ResponseStream> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            let fragments: Vec<Result<GenerateContentResponse>> = self
                .streams
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default()
                .into_iter()
                .map(Ok)
                .collect();
            Ok(Box::pin(futures::stream::iter(fragments)))
        }

        async fn list(&self, _request: ListRequest) -> Result<ListPage> {
            Ok(ListPage::default())
        }
    }

    fn text_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse::from_candidate(Candidate::new(Content::model(text)))
    }

    fn call_response(name: &str, args: serde_json::Map<String, serde_json::Value>) -> GenerateContentResponse {
        GenerateContentResponse::from_candidate(Candidate::new(Content::new(
            Role::Model,
            vec![Part::function_call(name, args)],
        )))
    }

    fn weather_args() -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("location".to_string(), json!("Boston"));
        args
    }

    fn weather_tool(executions: Arc<AtomicUsize>) -> Arc<dyn Tool> {
        let declaration = FunctionDeclaration::new(
            "get_current_weather",
            "Get the current weather for a city",
            SchemaBuilder::new()
                .param::<String>("location", "The city to look up")
                .build()
                .unwrap(),
        )
        .unwrap();
        Arc::new(FunctionTool::from_fn(declaration, move |args| {
            executions.fetch_add(1, Ordering::SeqCst);
            let _location: String = get_arg(&args, "location")?;
            Ok(json!("sunny"))
        }))
    }

    fn registry_with(tool: Arc<dyn Tool>) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::from_tools([tool]).unwrap())
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(call_response("get_current_weather", weather_args())),
            Ok(text_response("It is sunny in Boston.")),
        ]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let conversation =
            ConversationLoop::new(transport.clone(), registry, Default::default()).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("Weather in Boston?")], None)
            .await
            .unwrap();

        assert_eq!(response.text().as_deref(), Some("It is sunny in Boston."));
        assert_eq!(transport.calls_made(), 2);
        assert_eq!(executions.load(Ordering::SeqCst), 1);

        // user prompt, model call content, tool response content
        assert_eq!(response.call_history.len(), 3);
        assert_eq!(response.call_history[1].role, Role::Model);
        assert_eq!(response.call_history[2].role, Role::Tool);
        match &response.call_history[2].parts[0] {
            Part::FunctionResponse { response } => {
                assert_eq!(response.name, "get_current_weather");
                assert_eq!(response.response.as_ref().unwrap()["result"], json!("sunny"));
            }
            other => panic!("expected a function response part, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_budget_is_inclusive_of_first_call() {
        // The model never stops asking; with a budget of 3 the loop issues
        // exactly 3 remote calls and 2 tool rounds.
        let script: Vec<Result<GenerateContentResponse>> = (0..10)
            .map(|_| Ok(call_response("get_current_weather", weather_args())))
            .collect();
        let transport = Arc::new(MockTransport::new(script));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let config = FunctionCallingConfig {
            maximum_remote_calls: 3,
            ..Default::default()
        };
        let conversation = ConversationLoop::new(transport.clone(), registry, config).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert_eq!(transport.calls_made(), 3);
        assert_eq!(executions.load(Ordering::SeqCst), 2);
        // The budget ran out while the model still wanted a call; the
        // response is surfaced as-is.
        assert!(!response.function_calls().is_empty());
    }

    #[tokio::test]
    async fn test_budget_of_one_returns_first_response() {
        let transport = Arc::new(MockTransport::new(vec![Ok(call_response(
            "get_current_weather",
            weather_args(),
        ))]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let config = FunctionCallingConfig {
            maximum_remote_calls: 1,
            ..Default::default()
        };
        let conversation = ConversationLoop::new(transport.clone(), registry, config).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert_eq!(transport.calls_made(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
        assert!(!response.function_calls().is_empty());
    }

    #[tokio::test]
    async fn test_disable_returns_raw_calls_after_one_remote_call() {
        let transport = Arc::new(MockTransport::new(vec![Ok(call_response(
            "get_current_weather",
            weather_args(),
        ))]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let config = FunctionCallingConfig {
            disable: true,
            maximum_remote_calls: 10,
            ..Default::default()
        };
        let conversation = ConversationLoop::new(transport.clone(), registry, config).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert_eq!(transport.calls_made(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
        assert_eq!(response.function_calls()[0].name, "get_current_weather");
    }

    #[tokio::test]
    async fn test_schema_only_tool_forces_manual_mode() {
        let transport = Arc::new(MockTransport::new(vec![Ok(call_response(
            "manual_only",
            ToolArgs::new(),
        ))]));
        let declaration = FunctionDeclaration::new(
            "manual_only",
            "",
            SchemaBuilder::new().build().unwrap(),
        )
        .unwrap();
        let registry =
            registry_with(Arc::new(DeclaredFunction::new(declaration)) as Arc<dyn Tool>);

        let conversation =
            ConversationLoop::new(transport.clone(), registry, Default::default()).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert_eq!(transport.calls_made(), 1);
        assert_eq!(response.function_calls()[0].name, "manual_only");
    }

    #[tokio::test]
    async fn test_failing_tool_continues_the_loop() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(call_response("broken", ToolArgs::new())),
            Ok(text_response("recovered")),
        ]));
        let declaration = FunctionDeclaration::new(
            "broken",
            "",
            SchemaBuilder::new().build().unwrap(),
        )
        .unwrap();
        let tool = Arc::new(FunctionTool::from_fn(declaration, |_| {
            Err(ToolError::Invocation {
                name: "broken".to_string(),
                message: "boom".to_string(),
            }
            .into())
        })) as Arc<dyn Tool>;

        let conversation =
            ConversationLoop::new(transport.clone(), registry_with(tool), Default::default())
                .unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert_eq!(response.text().as_deref(), Some("recovered"));
        assert_eq!(transport.calls_made(), 2);
        match &response.call_history[2].parts[0] {
            Part::FunctionResponse { response } => {
                assert!(response.is_error());
                assert!(response.error.as_ref().unwrap().contains("boom"));
            }
            other => panic!("expected a function response part, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_errors_are_fatal() {
        let transport = Arc::new(MockTransport::new(vec![Err(TransportError::Api {
            status: 500,
            message: "server error".to_string(),
        }
        .into())]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions));

        let conversation =
            ConversationLoop::new(transport, registry, Default::default()).unwrap();
        let result = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await;

        assert!(matches!(
            result,
            Err(Error::Transport(TransportError::Api { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_ignore_call_history_omits_transcript() {
        let transport = Arc::new(MockTransport::new(vec![
            Ok(call_response("get_current_weather", weather_args())),
            Ok(text_response("done")),
        ]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions));

        let config = FunctionCallingConfig {
            ignore_call_history: true,
            ..Default::default()
        };
        let conversation = ConversationLoop::new(transport, registry, config).unwrap();
        let response = conversation
            .run("test-model", vec![Content::user("go")], None)
            .await
            .unwrap();

        assert!(response.call_history.is_empty());
    }

    #[tokio::test]
    async fn test_streaming_spans_turns_in_one_sequence() {
        let transport = Arc::new(MockTransport::with_streams(vec![
            vec![
                text_response("Checking "),
                call_response("get_current_weather", weather_args()),
            ],
            vec![text_response("The "), text_response("sky is blue.")],
        ]));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let conversation =
            ConversationLoop::new(transport.clone(), registry, Default::default()).unwrap();
        let mut stream = conversation.run_stream(
            "test-model".to_string(),
            vec![Content::user("Weather in Boston?")],
            None,
        );

        let mut fragments = Vec::new();
        while let Some(fragment) = stream.next().await {
            fragments.push(fragment.unwrap());
        }

        // Both turns arrive on the same caller-visible sequence.
        assert_eq!(fragments.len(), 4);
        assert_eq!(transport.calls_made(), 2);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(fragments[1].candidates[0].content.has_function_calls());
        assert_eq!(fragments[3].text().as_deref(), Some("sky is blue."));
    }

    #[tokio::test]
    async fn test_streaming_respects_budget() {
        let streams: Vec<Vec<GenerateContentResponse>> = (0..10)
            .map(|_| vec![call_response("get_current_weather", weather_args())])
            .collect();
        let transport = Arc::new(MockTransport::with_streams(streams));
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = registry_with(weather_tool(executions.clone()));

        let config = FunctionCallingConfig {
            maximum_remote_calls: 2,
            ..Default::default()
        };
        let conversation =
            ConversationLoop::new(transport.clone(), registry, config).unwrap();
        let mut stream =
            conversation.run_stream("test-model".to_string(), vec![Content::user("go")], None);
        while let Some(fragment) = stream.next().await {
            fragment.unwrap();
        }

        assert_eq!(transport.calls_made(), 2);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_budget_rejected_at_construction() {
        let transport = Arc::new(MockTransport::new(Vec::new()));
        let registry = Arc::new(ToolRegistry::new());
        let config = FunctionCallingConfig {
            maximum_remote_calls: 0,
            ..Default::default()
        };
        assert!(ConversationLoop::new(transport, registry, config).is_err());
    }
}
