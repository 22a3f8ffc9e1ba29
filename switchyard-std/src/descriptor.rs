//! Route registration surface.
//!
//! A [`RouteDescriptor`] is everything the table needs to know about one
//! handler: its template, gates, tags, hooks and the type-erased handler.
//! Discovery of descriptors is left to a [`RouteDescriptorProvider`].

use std::{collections::HashMap, sync::Arc};
use switchyard_core::{DynHandler, DynHook, Handler, Hook, MethodSet, ParamKind, erase};

/// A hook together with its ordering and filters.
#[derive(Clone)]
pub struct HookDescriptor {
    hook: Arc<dyn DynHook>,
    name: String,
    order: Option<i32>,
    only_tags: Vec<String>,
    except_tags: Vec<String>,
    only_on_success: bool,
    only_on_error: bool,
}

impl std::fmt::Debug for HookDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDescriptor")
            .field("name", &self.name)
            .field("order", &self.order)
            .field("only_tags", &self.only_tags)
            .field("except_tags", &self.except_tags)
            .finish_non_exhaustive()
    }
}

impl HookDescriptor {
    /// Wrap `hook`, named after its type.
    pub fn new<H: Hook>(hook: H) -> Self {
        Self::from_dyn(std::any::type_name::<H>(), Arc::new(hook))
    }

    /// Wrap an already shared hook.
    pub fn from_dyn(name: impl Into<String>, hook: Arc<dyn DynHook>) -> Self {
        Self {
            hook,
            name: name.into(),
            order: None,
            only_tags: Vec::new(),
            except_tags: Vec::new(),
            only_on_success: false,
            only_on_error: false,
        }
    }

    /// Set the name used for logging and tie-breaking.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run at position `order`; lower runs first, unordered hooks run last.
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Only apply to routes carrying at least one of `tags`.
    pub fn only_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Never apply to routes carrying any of `tags`.
    pub fn except_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// As an after-hook, run only when the response status is below 300.
    pub fn only_on_success(mut self) -> Self {
        self.only_on_success = true;
        self
    }

    /// As an after-hook, run only when the response status is 300 or above.
    pub fn only_on_error(mut self) -> Self {
        self.only_on_error = true;
        self
    }

    /// The hook.
    pub fn hook(&self) -> &Arc<dyn DynHook> {
        &self.hook
    }

    /// The hook's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit position, if any.
    pub fn position(&self) -> Option<i32> {
        self.order
    }

    /// Whether the hook applies to a route with `tags`.
    pub fn applies_to(&self, tags: &[String]) -> bool {
        let included =
            self.only_tags.is_empty() || self.only_tags.iter().any(|t| tags.contains(t));
        let excluded = self.except_tags.iter().any(|t| tags.contains(t));
        included && !excluded
    }

    /// Whether an after-hook runs for a response with `status`.
    pub fn runs_for_status(&self, status: u16) -> bool {
        let success = status < 300;
        !(self.only_on_success && !success) && !(self.only_on_error && success)
    }
}

/// Sort hooks by explicit order, unordered last, then by name.
pub fn sort_hooks(hooks: &mut [HookDescriptor]) {
    hooks.sort_by(|a, b| {
        let rank = |h: &HookDescriptor| (h.order.is_none(), h.order.unwrap_or_default());
        rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
    });
}

/// One handler and how to reach it.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub(crate) template: String,
    pub(crate) methods: MethodSet,
    pub(crate) accept: Vec<String>,
    pub(crate) defaults: HashMap<String, Vec<String>>,
    pub(crate) tags: Vec<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) before: Vec<HookDescriptor>,
    pub(crate) after: Vec<HookDescriptor>,
    pub(crate) handler: Arc<dyn DynHandler>,
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("template", &self.template)
            .field("methods", &self.methods)
            .field("params", &self.handler.params())
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

impl RouteDescriptor {
    /// Route `template` to `handler`. Accepts `GET` until told otherwise.
    pub fn new<H, Args>(template: impl Into<String>, handler: H) -> Self
    where
        H: Handler<Args>,
        Args: Send + 'static,
    {
        Self::from_dyn(template, erase(handler))
    }

    /// Route `template` to an already erased handler.
    pub fn from_dyn(template: impl Into<String>, handler: Arc<dyn DynHandler>) -> Self {
        Self {
            template: template.into(),
            methods: MethodSet::default(),
            accept: Vec::new(),
            defaults: HashMap::new(),
            tags: Vec::new(),
            content_type: None,
            before: Vec::new(),
            after: Vec::new(),
            handler,
        }
    }

    /// Accept exactly `methods`.
    pub fn methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    /// Accept requests whose media type fully matches `pattern`.
    pub fn accept(mut self, pattern: impl Into<String>) -> Self {
        self.accept.push(pattern.into());
        self
    }

    /// Values used when query parameter `name` is absent.
    pub fn default_value<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Tag the route.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Content type set on the response before the handler runs.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a before-hook for this route only.
    pub fn before(mut self, hook: HookDescriptor) -> Self {
        self.before.push(hook);
        self
    }

    /// Add an after-hook for this route only.
    pub fn after(mut self, hook: HookDescriptor) -> Self {
        self.after.push(hook);
        self
    }

    /// The template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Declared handler parameter kinds.
    pub fn params(&self) -> &[ParamKind] {
        self.handler.params()
    }
}

/// A source of route descriptors, queried once per table build.
pub trait RouteDescriptorProvider: Send + Sync {
    /// All routes to register.
    fn descriptors(&self) -> Vec<RouteDescriptor>;
}

impl RouteDescriptorProvider for Vec<RouteDescriptor> {
    fn descriptors(&self) -> Vec<RouteDescriptor> {
        self.clone()
    }
}

impl<F> RouteDescriptorProvider for F
where
    F: Fn() -> Vec<RouteDescriptor> + Send + Sync,
{
    fn descriptors(&self) -> Vec<RouteDescriptor> {
        (self)()
    }
}
