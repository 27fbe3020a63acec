use std::fs;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use camino::Utf8PathBuf;
use ng_appserver::ActionResults;
use ng_appserver::Component;
use ng_appserver::ComponentInstance;
use ng_appserver::Engine;
use ng_appserver::EngineError;
use ng_appserver::MapComponent;
use ng_appserver::MemoryLoader;
use ng_appserver::Page;
use ng_appserver::Request;
use ng_appserver::StateError;
use ng_appserver::Value;
use ng_conf::Settings;
use serde_json::json;

fn engine(templates: &[(&str, &str)]) -> Engine {
    let loader = MemoryLoader::new();
    for (name, html) in templates {
        loader.insert(&format!("{name}.html"), html);
    }
    Engine::builder()
        .loader(loader)
        .component("Counter", Counter::default)
        .component("Signup", Signup::default)
        .build()
}

fn page_with_values(engine: &Engine, name: &str, values: Value) -> Result<Page> {
    let instance = ComponentInstance::new(
        name,
        Box::new(MapComponent::from_value(values)),
        engine.template(name)?,
    );
    Ok(Arc::new(Mutex::new(instance)))
}

#[derive(Debug, Default)]
struct Counter {
    count: u64,
}

impl Component for Counter {
    fn value_for_key(&self, key: &str) -> Value {
        match key {
            "count" => json!(self.count),
            _ => Value::Null,
        }
    }

    fn take_value_for_key(&mut self, _key: &str, _value: Value) {}

    fn invoke_action(&mut self, action: &str) -> Result<Option<ActionResults>, EngineError> {
        match action {
            "increment" => {
                self.count += 1;
                Ok(None)
            }
            "done" => Ok(Some(ActionResults::PageNamed("Done".to_string()))),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
struct Signup {
    name: Option<String>,
    greeting: Option<String>,
}

impl Component for Signup {
    fn value_for_key(&self, key: &str) -> Value {
        match key {
            "name" => self.name.clone().map_or(Value::Null, Value::String),
            "greeting" => self.greeting.clone().map_or(Value::Null, Value::String),
            _ => Value::Null,
        }
    }

    fn take_value_for_key(&mut self, key: &str, value: Value) {
        if key == "name" {
            self.name = value.as_str().map(str::to_string);
        }
    }

    fn invoke_action(&mut self, action: &str) -> Result<Option<ActionResults>, EngineError> {
        if action == "save" {
            self.greeting = self.name.as_ref().map(|name| format!("Hello {name}"));
        }
        Ok(None)
    }
}

const COUNTER: &str = r#"<wo:str value="$count" /><wo:link action="$increment">+</wo:link>"#;

mod component_actions {
    use super::*;

    #[test]
    fn test_action_updates_cached_page() -> Result<()> {
        let engine = engine(&[("Counter", COUNTER)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Counter")?));
        let response = engine.render_page(&mut session, page, &Request::get("/"))?;
        assert_eq!(response.content(), r#"0<a href="/wo/1.1">+</a>"#);

        let response = engine.handle_component_request(&mut session, &Request::get("/wo/1.1"))?;
        assert_eq!(response.content(), r#"1<a href="/wo/2.1">+</a>"#);

        // Both context ids restore the same live page.
        let response = engine.handle_component_request(&mut session, &Request::get("/wo/1.1"))?;
        assert_eq!(response.content(), r#"2<a href="/wo/3.1">+</a>"#);
        assert_eq!(session.page_cache().len(), 3);
        Ok(())
    }

    #[test]
    fn test_action_returning_page_name() -> Result<()> {
        let engine = engine(&[
            ("Counter", r#"<wo:link action="$done">done</wo:link>"#),
            ("Done", "<p>all done</p>"),
        ]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Counter")?));
        engine.render_page(&mut session, page, &Request::get("/"))?;

        let response = engine.handle_component_request(&mut session, &Request::get("/wo/1.0"))?;
        assert_eq!(response.content(), "<p>all done</p>");
        assert_eq!(session.page_cache().len(), 1);
        Ok(())
    }

    #[test]
    fn test_unknown_sender_rerenders_page() -> Result<()> {
        let engine = engine(&[("Counter", COUNTER)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Counter")?));
        engine.render_page(&mut session, page, &Request::get("/"))?;

        let response = engine.handle_component_request(&mut session, &Request::get("/wo/1.7"))?;
        assert_eq!(response.content(), r#"0<a href="/wo/2.1">+</a>"#);
        Ok(())
    }

    #[test]
    fn test_response_from_action() -> Result<()> {
        #[derive(Debug, Default)]
        struct Redirecting;

        impl Component for Redirecting {
            fn value_for_key(&self, _key: &str) -> Value {
                Value::Null
            }

            fn take_value_for_key(&mut self, _key: &str, _value: Value) {}

            fn invoke_action(&mut self, _action: &str) -> Result<Option<ActionResults>, EngineError> {
                Ok(Some(ActionResults::Response(ng_appserver::Response::redirect("/bye"))))
            }
        }

        let loader = MemoryLoader::new();
        loader.insert("Main.html", r#"<wo:link action="$leave">leave</wo:link>"#);
        let engine = Engine::builder()
            .loader(loader)
            .component("Main", || Redirecting)
            .build();
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Main")?));
        engine.render_page(&mut session, page, &Request::get("/"))?;
        let response = engine.handle_component_request(&mut session, &Request::get("/wo/1.0"))?;
        assert_eq!(response.status(), 302);
        assert_eq!(response.header("location"), Some("/bye"));
        Ok(())
    }
}

mod forms {
    use super::*;

    const SIGNUP: &str = concat!(
        r#"<wo:form><wo:textfield value="$name" /><wo:submit action="$save" value="Save" /></wo:form>"#,
        r#"<wo:if condition="$greeting"><p><wo:str value="$greeting" /></p></wo:if>"#,
    );

    #[test]
    fn test_submit_takes_values_then_invokes() -> Result<()> {
        let engine = engine(&[("Signup", SIGNUP)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Signup")?));
        let response = engine.render_page(&mut session, page, &Request::get("/"))?;
        assert_eq!(
            response.content(),
            r#"<form method="post" action="/wo/1.0"><input type="text" name="0.0"/><input type="submit" name="0.1" value="Save"/></form>"#
        );

        let request = Request::post("/wo/1.0")
            .with_form_value("0.0", "Hugi")
            .with_form_value("0.1", "Save");
        let response = engine.handle_component_request(&mut session, &request)?;
        assert!(response.content().ends_with("<p>Hello Hugi</p>"), "{}", response.content());
        assert!(response.content().contains(r#"action="/wo/2.0""#));
        assert!(response.content().contains(r#"value="Hugi""#));
        Ok(())
    }

    #[test]
    fn test_duplicate_field_values_are_rejected() -> Result<()> {
        let engine = engine(&[("Signup", SIGNUP)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = Arc::new(Mutex::new(engine.page_with_name("Signup")?));
        engine.render_page(&mut session, page, &Request::get("/"))?;

        let request = Request::post("/wo/1.0")
            .with_form_value("0.0", "a")
            .with_form_value("0.0", "b");
        assert_eq!(
            engine.handle_component_request(&mut session, &request),
            Err(EngineError::State(StateError::MultipleFormValues {
                name: "0.0".to_string(),
                count: 2,
            }))
        );
        Ok(())
    }
}

mod child_components {
    use super::*;

    #[test]
    fn test_bindings_pull_and_push() -> Result<()> {
        let engine = engine(&[
            ("Parent", r#"<wo:form><wo:Child title="$title" /></wo:form>"#),
            ("Child", r#"<wo:textfield value="$title" />"#),
        ]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = page_with_values(&engine, "Parent", json!({ "title": "a" }))?;
        let response = engine.render_page(&mut session, Arc::clone(&page), &Request::get("/"))?;
        assert_eq!(
            response.content(),
            r#"<form method="post" action="/wo/1.0"><input type="text" name="0.0" value="a"/></form>"#
        );

        let request = Request::post("/wo/1.0").with_form_value("0.0", "b");
        let response = engine.handle_component_request(&mut session, &request)?;
        assert_eq!(
            response.content(),
            r#"<form method="post" action="/wo/2.0"><input type="text" name="0.0" value="b"/></form>"#
        );

        let page = page.lock().unwrap();
        assert_eq!(page.component().value_for_key("title"), json!("b"));
        assert_eq!(page.child_count(), 1);
        Ok(())
    }

    #[test]
    fn test_content_renders_in_caller_scope() -> Result<()> {
        let engine = engine(&[
            ("Main", r#"<wo:Frame title="Inbox"><wo:str value="$who" /></wo:Frame>"#),
            ("Frame", r#"<section><h1><wo:str value="$title" /></h1><wo:content /></section>"#),
        ]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = page_with_values(&engine, "Main", json!({ "who": "me", "title": "outer" }))?;
        let response = engine.render_page(&mut session, page, &Request::get("/"))?;
        assert_eq!(response.content(), "<section><h1>Inbox</h1>me</section>");
        Ok(())
    }

    #[test]
    fn test_unknown_component_fails_template() {
        let engine = engine(&[("Main", "<wo:Missing />")]);
        assert_eq!(engine.page_with_name("Main").unwrap_err().diagnostic_code(), "L100");
    }
}

mod paths {
    use super::*;

    const LIST: &str = concat!(
        r#"<ul><wo:repetition list="$items" item="$item"><li><wo:str value="$item" /></li></wo:repetition></ul>"#,
        r#"<wo:link action="$refresh">refresh</wo:link>"#,
    );

    #[test]
    fn test_rendering_is_deterministic() -> Result<()> {
        let engine = engine(&[("List", LIST)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        let page = page_with_values(&engine, "List", json!({ "items": ["a", "b"] }))?;
        let first = engine.render_page(&mut session, Arc::clone(&page), &Request::get("/"))?;
        let second = engine.render_page(&mut session, page, &Request::get("/"))?;

        assert_eq!(
            first.content(),
            r#"<ul><li>a</li><li>b</li></ul><a href="/wo/1.3">refresh</a>"#
        );
        assert_eq!(
            second.content(),
            first.content().replace("/wo/1.", "/wo/2.")
        );
        Ok(())
    }
}

mod page_cache {
    use super::*;

    #[test]
    fn test_evicted_page_is_not_found() -> Result<()> {
        let loader = MemoryLoader::new();
        loader.insert("Counter.html", COUNTER);
        let settings = Settings {
            page_cache_size: 1,
            ..Settings::default()
        };
        let engine = Engine::builder()
            .settings(settings)
            .loader(loader)
            .component("Counter", Counter::default)
            .build();
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();

        for _ in 0..2 {
            let page = Arc::new(Mutex::new(engine.page_with_name("Counter")?));
            engine.render_page(&mut session, page, &Request::get("/"))?;
        }

        assert_eq!(
            engine.handle_component_request(&mut session, &Request::get("/wo/1.1")),
            Err(EngineError::State(StateError::PageNotFound("1".to_string())))
        );
        let response = engine.handle_component_request(&mut session, &Request::get("/wo/2.1"))?;
        assert_eq!(response.content(), r#"1<a href="/wo/3.1">+</a>"#);
        Ok(())
    }

    #[test]
    fn test_invalid_action_url() {
        let engine = engine(&[("Counter", COUNTER)]);
        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();
        assert_eq!(
            engine.handle_component_request(&mut session, &Request::get("/wo/abc")),
            Err(EngineError::State(StateError::InvalidActionUrl(
                "/wo/abc".to_string()
            )))
        );
    }
}

mod template_directories {
    use super::*;

    #[test]
    fn test_templates_from_configured_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join("Greeting.html"),
            r#"<h1><wo name="title"></wo></h1>"#,
        )?;
        fs::write(
            dir.path().join("Greeting.wod"),
            "title : String {\n    value = \"Welcome\";\n}\n",
        )?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow::anyhow!("non UTF-8 path {}", path.display()))?;

        let settings = Settings {
            template_dirs: vec![root],
            ..Settings::default()
        };
        let engine = Engine::builder().settings(settings).build();
        assert!(engine.has_component("Greeting"));

        let session = engine.sessions().create();
        let mut session = session.lock().unwrap();
        let page = Arc::new(Mutex::new(engine.page_with_name("Greeting")?));
        let response = engine.render_page(&mut session, page, &Request::get("/"))?;
        assert_eq!(response.content(), "<h1>Welcome</h1>");
        Ok(())
    }
}
