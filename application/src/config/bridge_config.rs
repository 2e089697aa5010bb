//! Bridge configuration.
//!
//! [`BridgeConfig`] groups what the bridge needs at construction time: the
//! launch spec, the response marker and the dispatch policy. Unlike the
//! file-level config in infrastructure, these are already-validated values.

use replbridge_domain::{
    DebuggerDialect, DispatchPolicy, DomainError, LaunchSpec, ResponseMarker, ResponseMatcher,
    TerminationPolicy,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub launch: LaunchSpec,
    pub matcher: Arc<dyn ResponseMatcher>,
    pub dispatch: DispatchPolicy,
}

impl BridgeConfig {
    pub fn new(launch: LaunchSpec, matcher: Arc<dyn ResponseMatcher>) -> Self {
        Self {
            launch,
            matcher,
            dispatch: DispatchPolicy::default(),
        }
    }

    /// Build from a launch spec and a marker regex.
    pub fn with_pattern(launch: LaunchSpec, pattern: &str) -> Result<Self, DomainError> {
        Ok(Self::new(launch, Arc::new(ResponseMarker::new(pattern)?)))
    }

    /// Launch command and marker taken from a debugger dialect.
    pub fn for_dialect(dialect: &dyn DebuggerDialect) -> Self {
        Self::new(dialect.launch_spec(), Arc::new(dialect.response_marker()))
    }

    // ==================== Builder Methods ====================

    pub fn with_launch(mut self, launch: LaunchSpec) -> Self {
        self.launch = launch;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn ResponseMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchPolicy) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.dispatch = self.dispatch.with_min_interval(interval);
        self
    }

    pub fn with_termination_policy(mut self, policy: TerminationPolicy) -> Self {
        self.dispatch = self.dispatch.with_termination_policy(policy);
        self
    }
}
