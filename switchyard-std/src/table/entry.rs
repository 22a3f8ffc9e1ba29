use crate::{
    binding::BindingPlan,
    descriptor::{HookDescriptor, RouteDescriptor, sort_hooks},
    pattern::{CompiledCriteria, SymbolTable},
    template::ParsedTemplate,
};
use std::sync::Arc;
use switchyard_core::{DynHandler, ResponseKind, RouteConfigError};

/// One compiled route. Immutable once the table is built.
pub struct RouteEntry {
    index: usize,
    template: Arc<str>,
    tags: Arc<[String]>,
    criteria: CompiledCriteria,
    plan: BindingPlan,
    before: Vec<HookDescriptor>,
    after: Vec<HookDescriptor>,
    handler: Arc<dyn DynHandler>,
    response_kind: ResponseKind,
    content_type: Option<String>,
}

impl std::fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEntry")
            .field("index", &self.index)
            .field("template", &self.template)
            .field("all_fixed", &self.criteria.all_fixed())
            .field("query_criteria", &self.criteria.query().len())
            .finish_non_exhaustive()
    }
}

impl RouteEntry {
    /// Compile `descriptor`, registered at position `index`.
    ///
    /// Table-wide hooks are merged with the route's own when their tag
    /// filters accept the route.
    pub(crate) fn compile(
        index: usize,
        descriptor: RouteDescriptor,
        symbols: &SymbolTable,
        before: &[HookDescriptor],
        after: &[HookDescriptor],
    ) -> Result<Self, RouteConfigError> {
        let parsed = ParsedTemplate::parse(&descriptor.template)?;
        let params = descriptor.handler.params();
        let criteria = CompiledCriteria::compile(&parsed, params, symbols)?
            .with_methods(descriptor.methods)
            .with_accept(&descriptor.accept)?
            .with_defaults(descriptor.defaults);
        let plan = BindingPlan::build(&criteria, params)?;

        let merge = |global: &[HookDescriptor], own: Vec<HookDescriptor>| {
            let mut hooks: Vec<_> = global
                .iter()
                .filter(|h| h.applies_to(&descriptor.tags))
                .cloned()
                .chain(own)
                .collect();
            sort_hooks(&mut hooks);
            hooks
        };
        let before = merge(before, descriptor.before);
        let after = merge(after, descriptor.after);

        Ok(Self {
            index,
            template: Arc::from(descriptor.template.as_str()),
            tags: Arc::from(descriptor.tags),
            response_kind: descriptor.handler.response_kind(),
            handler: descriptor.handler,
            content_type: descriptor.content_type,
            criteria,
            plan,
            before,
            after,
        })
    }

    /// Registration position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The route template.
    pub fn template(&self) -> &Arc<str> {
        &self.template
    }

    /// The route's tags.
    pub fn tags(&self) -> &Arc<[String]> {
        &self.tags
    }

    /// Compiled criteria.
    pub fn criteria(&self) -> &CompiledCriteria {
        &self.criteria
    }

    /// Binding plan.
    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    /// Before-hooks in run order.
    pub fn before(&self) -> &[HookDescriptor] {
        &self.before
    }

    /// After-hooks in run order.
    pub fn after(&self) -> &[HookDescriptor] {
        &self.after
    }

    /// The handler.
    pub fn handler(&self) -> &Arc<dyn DynHandler> {
        &self.handler
    }

    /// What the handler's output writes.
    pub fn response_kind(&self) -> ResponseKind {
        self.response_kind
    }

    /// Content type declared by the route.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}
