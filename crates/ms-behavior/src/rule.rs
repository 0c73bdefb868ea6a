//! Rules and the two conditions built on them.

use ms_core::{Event, ModeId};

use crate::{AgentView, RuleResult, Site};

/// An executable predicate or action run by an agent.
///
/// `site` is `Some` when the agent is acting over a cell and `None` for a
/// global agent without action regions.  For a [`JumpCondition`] the returned
/// flag decides whether the transition fires; for a [`FlowCondition`] it is
/// ignored.  An `Err` is a rule failure, handled according to the agent's
/// `FailurePolicy`.
///
/// Closures with the matching signature are rules; use
/// [`JumpCondition::from_fn`] / [`FlowCondition::from_fn`] so the compiler can
/// infer their argument types.
pub trait Rule {
    fn execute(
        &mut self,
        event: &Event,
        agent: &AgentView,
        site:  Option<&mut Site<'_>>,
    ) -> RuleResult<bool>;
}

impl<F> Rule for F
where
    F: FnMut(&Event, &AgentView, Option<&mut Site<'_>>) -> RuleResult<bool>,
{
    fn execute(
        &mut self,
        event: &Event,
        agent: &AgentView,
        site:  Option<&mut Site<'_>>,
    ) -> RuleResult<bool> {
        self(event, agent, site)
    }
}

// ── JumpCondition ─────────────────────────────────────────────────────────────

/// A rule that, when it fires, moves the agent (or the cell) to another
/// control mode.
///
/// The target is stored by name and resolved to a [`ModeId`] by
/// `Agent::build`.
pub struct JumpCondition {
    target_name: String,
    target:      Option<ModeId>,
    rule:        Box<dyn Rule>,
}

impl JumpCondition {
    pub fn new(target: impl Into<String>, rule: impl Rule + 'static) -> Self {
        Self { target_name: target.into(), target: None, rule: Box::new(rule) }
    }

    pub fn from_fn<F>(target: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&Event, &AgentView, Option<&mut Site<'_>>) -> RuleResult<bool> + 'static,
    {
        Self::new(target, f)
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// The resolved target, or `None` before a successful build.
    pub fn target(&self) -> Option<ModeId> {
        self.target
    }

    pub(crate) fn resolve(&mut self, target: ModeId) {
        self.target = Some(target);
    }

    pub(crate) fn evaluate(
        &mut self,
        event: &Event,
        agent: &AgentView,
        site:  Option<&mut Site<'_>>,
    ) -> RuleResult<bool> {
        self.rule.execute(event, agent, site)
    }
}

impl std::fmt::Debug for JumpCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JumpCondition")
            .field("target_name", &self.target_name)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// ── FlowCondition ─────────────────────────────────────────────────────────────

/// A rule run for its side effects; its flag is ignored.
pub struct FlowCondition {
    rule: Box<dyn Rule>,
}

impl FlowCondition {
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self { rule: Box::new(rule) }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&Event, &AgentView, Option<&mut Site<'_>>) -> RuleResult<bool> + 'static,
    {
        Self::new(f)
    }

    pub(crate) fn evaluate(
        &mut self,
        event: &Event,
        agent: &AgentView,
        site:  Option<&mut Site<'_>>,
    ) -> RuleResult<bool> {
        self.rule.execute(event, agent, site)
    }
}

impl std::fmt::Debug for FlowCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowCondition").finish_non_exhaustive()
    }
}
