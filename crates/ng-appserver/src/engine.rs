use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;

use ng_conf::Settings;
use ng_source::FxDashMap;
use ng_templates::SourceKind;
use tracing::instrument;

use crate::component::ActionResults;
use crate::component::Component;
use crate::component::ComponentInstance;
use crate::context::Context;
use crate::element_path::ElementPath;
use crate::error::EngineError;
use crate::error::LookupError;
use crate::error::StateError;
use crate::loader::DirectoryLoader;
use crate::loader::ResourceLoader;
use crate::loader::TEMPLATE_NAMESPACE;
use crate::registry::ElementFactory;
use crate::registry::ElementRegistry;
use crate::request::Request;
use crate::request::Response;
use crate::scope::ComponentScope;
use crate::session::Page;
use crate::session::Session;
use crate::session::SessionStore;
use crate::template::Template;

type TemplateCell = Arc<OnceLock<Result<Arc<Template>, EngineError>>>;

/// Owns everything shared between requests: the element registry, the
/// template cache and the session store.
#[derive(Debug)]
pub struct Engine {
    registry: ElementRegistry,
    loader: Box<dyn ResourceLoader>,
    templates: FxDashMap<String, TemplateCell>,
    sessions: SessionStore,
    settings: Settings,
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Whether `name` can be embedded as a component, either because it is
    /// registered or because a template with that name exists.
    #[must_use]
    pub fn has_component(&self, name: &str) -> bool {
        self.registry.has_component(name)
            || self
                .loader
                .exists(TEMPLATE_NAMESPACE, &format!("{name}.html"))
    }

    /// The compiled template for component `name`.
    ///
    /// Compiled at most once. Concurrent first requests for the same name wait
    /// for a single compilation, and a failure is remembered like a success.
    pub fn template(&self, name: &str) -> Result<Arc<Template>, EngineError> {
        let cell = Arc::clone(self.templates.entry(name.to_string()).or_default().value());
        cell.get_or_init(|| self.compile_template(name)).clone()
    }

    fn compile_template(&self, name: &str) -> Result<Arc<Template>, EngineError> {
        let result = self.load_template(name);
        match &result {
            Ok(template) => tracing::info!(
                template = name,
                dynamic = template.root().dynamic_count(),
                "compiled template"
            ),
            Err(EngineError::Format(error)) => {
                let path = match error.source_kind() {
                    SourceKind::Template => format!("{name}.html"),
                    SourceKind::Declarations => format!("{name}.wod"),
                };
                tracing::warn!(
                    template = name,
                    code = error.diagnostic_code(),
                    "failed to compile template\n{}",
                    error.render(&path)
                );
            }
            Err(error) => tracing::warn!(
                template = name,
                code = error.diagnostic_code(),
                %error,
                "failed to compile template"
            ),
        }
        result
    }

    fn load_template(&self, name: &str) -> Result<Arc<Template>, EngineError> {
        let html = self
            .loader
            .load(TEMPLATE_NAMESPACE, &format!("{name}.html"))?
            .ok_or_else(|| LookupError::Template(name.to_string()))?;
        let declarations = self
            .loader
            .load(TEMPLATE_NAMESPACE, &format!("{name}.wod"))?
            .unwrap_or_default();

        let tree = ng_templates::compile(&html, &declarations)?;
        Ok(Arc::new(Template::build(name, &tree, self)?))
    }

    /// A new instance of component `name` with no state from any caller.
    pub fn instantiate(&self, name: &str) -> Result<ComponentInstance, EngineError> {
        let template = self.template(name)?;
        let component = self.registry.create_component(name);
        Ok(ComponentInstance::new(name, component, template))
    }

    pub fn page_with_name(&self, name: &str) -> Result<ComponentInstance, EngineError> {
        self.instantiate(name)
    }

    /// Push the request's form values into the page.
    pub fn take_values(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        cx.element_path_mut().reset();
        let template = page_template(cx)?;
        template.root().take_values(cx)
    }

    /// Perform the action of the element the request was sent from.
    pub fn invoke_action(&self, cx: &mut Context<'_>) -> Result<Option<ActionResults>, EngineError> {
        cx.element_path_mut().reset();
        let template = page_template(cx)?;
        template.root().invoke_action(cx)
    }

    /// Render the page into the context's response.
    pub fn render(&self, cx: &mut Context<'_>) -> Result<(), EngineError> {
        cx.element_path_mut().reset();
        let template = page_template(cx)?;
        template.root().append_to_response(cx)
    }

    /// Render `page` as the response to `request`.
    ///
    /// A page that handed out action URLs while rendering is saved in the
    /// session's page cache under the new context id, so those URLs can find
    /// it again.
    pub fn render_page(
        &self,
        session: &mut Session,
        page: Page,
        request: &Request,
    ) -> Result<Response, EngineError> {
        let (response, context_id) = {
            let mut instance = page.lock()?;
            let mut cx = Context::new(
                self,
                request,
                session.context_ids_mut(),
                ComponentScope::new(&mut instance),
            );
            self.render(&mut cx)?;
            let context_id = cx.allocated_context_id().map(str::to_string);
            (cx.into_response(), context_id)
        };

        if let Some(context_id) = context_id {
            session.page_cache_mut().save(&context_id, page)?;
            tracing::debug!(session_id = session.id(), %context_id, "saved page");
        }
        Ok(response)
    }

    /// Run all three phases for a request to a component action URL,
    /// `/wo/<contextID>.<senderID>`.
    #[instrument(skip_all, fields(path = request.path()))]
    pub fn handle_component_request(
        &self,
        session: &mut Session,
        request: &Request,
    ) -> Result<Response, EngineError> {
        session.touch();
        let (context_id, sender_id) = parse_component_action_url(request.path())?;

        let page = session
            .page_cache()
            .restore(&context_id)
            .cloned()
            .ok_or_else(|| StateError::PageNotFound(context_id.clone()))?;
        session.page_cache_mut().retain(&context_id)?;

        let results = {
            let mut instance = page.lock()?;
            let mut cx = Context::new(
                self,
                request,
                session.context_ids_mut(),
                ComponentScope::new(&mut instance),
            )
            .with_sender_id(sender_id);
            self.take_values(&mut cx)?;
            self.invoke_action(&mut cx)?
        };

        let next = match results {
            None => page,
            Some(ActionResults::Page(instance)) => Arc::new(Mutex::new(instance)),
            Some(ActionResults::PageNamed(name)) => {
                tracing::debug!(page = %name, "action returned a page name");
                Arc::new(Mutex::new(self.page_with_name(&name)?))
            }
            Some(ActionResults::Response(response)) => return Ok(response),
        };
        self.render_page(session, next, request)
    }
}

fn page_template(cx: &Context<'_>) -> Result<Arc<Template>, EngineError> {
    cx.components()
        .get(0)
        .map(|page| Arc::clone(page.template()))
        .ok_or_else(|| StateError::ScopeUnderflow.into())
}

/// Split `/wo/<contextID>.<senderID>` into its two ids.
pub fn parse_component_action_url(path: &str) -> Result<(String, ElementPath), StateError> {
    let invalid = || StateError::InvalidActionUrl(path.to_string());
    let (context_id, sender_id) = path
        .strip_prefix("/wo/")
        .and_then(|rest| rest.split_once('.'))
        .ok_or_else(invalid)?;
    if context_id.is_empty() {
        return Err(invalid());
    }
    let sender_id = sender_id.parse::<ElementPath>().map_err(|_| invalid())?;
    Ok((context_id.to_string(), sender_id))
}

pub struct EngineBuilder {
    registry: ElementRegistry,
    loader: Option<Box<dyn ResourceLoader>>,
    settings: Settings,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            registry: ElementRegistry::default(),
            loader: None,
            settings: Settings::default(),
        }
    }
}

impl EngineBuilder {
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Where templates come from. Defaults to the settings' template directories.
    #[must_use]
    pub fn loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    #[must_use]
    pub fn element(mut self, namespace: &str, name: &str, factory: ElementFactory) -> Self {
        self.registry.register_element(namespace, name, factory);
        self
    }

    #[must_use]
    pub fn component<C, F>(mut self, name: &str, factory: F) -> Self
    where
        C: Component + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.registry.register_component(name, factory);
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        let loader = self
            .loader
            .unwrap_or_else(|| Box::new(DirectoryLoader::new(self.settings.template_dirs.clone())));
        let sessions = SessionStore::new(
            self.settings.page_cache_size,
            Duration::from_secs(self.settings.session_timeout_secs),
        );
        Engine {
            registry: self.registry,
            loader,
            templates: FxDashMap::default(),
            sessions,
            settings: self.settings,
        }
    }
}
