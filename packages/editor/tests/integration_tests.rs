//! End-to-end session tests against a scripted render service: page load,
//! the setting-update round trip, nested-block refresh, language variants,
//! drop and duplicate, and explicit save.

use anyhow::Result;
use pagebloc_editor::{
    EditMode, EditSession, PageLoad, RenderError, RenderService, RenderedBlock, SelectionPanel,
    UpdateOutcome,
};
use pagebloc_editor::{BlockState, PageStateData};
use pagebloc_engine::{BlockDefinition, SettingDescriptor, RenderedBlocks};
use pagebloc_tree::{
    is_style_identifier, ComponentNode, ATTR_BLOCK_ID, ATTR_BLOCK_SLUG, ATTR_CONTENT_CONTAINER,
    ATTR_IS_HTML, PLACEHOLDER_TAG,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Scripted render/persistence collaborator: hands out queued responses and
/// records everything it was asked.
#[derive(Default)]
struct ScriptedServer {
    responses: Mutex<VecDeque<Result<RenderedBlock, RenderError>>>,
    render_requests: Mutex<Vec<PageStateData>>,
    persisted: Mutex<Vec<(String, String)>>,
}

impl ScriptedServer {
    fn respond_with(self, response: Result<RenderedBlock, RenderError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

impl RenderService for ScriptedServer {
    async fn render_block(
        &self,
        data: &PageStateData,
        _language: &str,
    ) -> Result<RenderedBlock, RenderError> {
        self.render_requests.lock().unwrap().push(data.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RenderError::Request("no scripted response".to_string())))
    }

    async fn persist_page(&self, html: &str, style: &str) -> Result<(), RenderError> {
        self.persisted
            .lock()
            .unwrap()
            .push((html.to_string(), style.to_string()));
        Ok(())
    }
}

fn placeholder(block_id: &str) -> ComponentNode {
    ComponentNode::element(PLACEHOLDER_TAG).with_attr(ATTR_BLOCK_ID, block_id)
}

fn wrapper(block_id: &str, children: Vec<ComponentNode>) -> ComponentNode {
    ComponentNode::element(PLACEHOLDER_TAG)
        .with_attr(ATTR_BLOCK_ID, block_id)
        .with_attr(ATTR_BLOCK_SLUG, block_id)
        .with_attr(ATTR_IS_HTML, "false")
        .with_children(children)
}

fn heading(text: &str) -> ComponentNode {
    ComponentNode::element("h1").with_children(vec![ComponentNode::text(text)])
}

fn layout() -> Vec<ComponentNode> {
    let container = ComponentNode::element("div").with_attr(ATTR_CONTENT_CONTAINER, "");
    vec![ComponentNode::element("body").with_children(vec![container])]
}

fn hero_definition() -> BlockDefinition {
    BlockDefinition {
        slug: "hero".to_string(),
        template: vec![wrapper("hero", vec![heading("Welcome")])],
        settings: vec![SettingDescriptor {
            name: "title".to_string(),
            input_type: "text".to_string(),
            label: Some("Title".to_string()),
            default_value: Some("Welcome".to_string()),
        }],
        is_html: false,
    }
}

/// One-language page with a single dynamic `hero` block and a stored
/// `title` value.
fn hero_page() -> PageLoad {
    let rendered: RenderedBlocks =
        HashMap::from([("hero".to_string(), vec![wrapper("hero", vec![heading("Hello")])])]);
    let state = BlockState {
        settings: HashMap::from([("title".to_string(), "Hello".to_string())]),
        blocks: HashMap::new(),
    };

    PageLoad {
        page_id: "page-1".to_string(),
        layout: layout(),
        page_components: HashMap::from([("en".to_string(), vec![placeholder("hero")])]),
        rendered_blocks: HashMap::from([("en".to_string(), rendered)]),
        page_blocks: HashMap::from([(
            "en".to_string(),
            HashMap::from([("hero".to_string(), state)]),
        )]),
        blocks: vec![hero_definition()],
        languages: vec!["en".to_string()],
        current_language: "en".to_string(),
    }
}

fn find_block_root(session: &EditSession<ScriptedServer>, block_id: &str) -> ComponentNode {
    let mut found = None;
    session.tree().walk(&mut |node| {
        if node.block_id.as_deref() == Some(block_id) && node.is_block_root() {
            found = Some(node.clone());
        }
    });
    found.unwrap_or_else(|| panic!("no block root {block_id}"))
}

fn collect_text(node: &ComponentNode) -> String {
    let mut out = String::new();
    node.walk(&mut |n| {
        if let Some(text) = &n.text {
            out.push_str(text);
        }
    });
    out
}

#[tokio::test]
async fn test_page_load_materializes_hero_block() -> Result<()> {
    let session = EditSession::new(hero_page(), ScriptedServer::default())?;

    let container = session.content_container().unwrap();
    assert_eq!(container.children.len(), 1);

    let hero = find_block_root(&session, "hero");
    assert!(hero.is_style_wrapper, "dynamic block gets a wrapper root");
    assert!(hero.caps.removable);
    assert!(hero.caps.draggable);
    assert!(hero.caps.copyable);
    assert!(hero.caps.stylable);

    let identifier = hero.style_identifier.as_deref().unwrap();
    assert!(is_style_identifier(identifier));
    assert!(hero.has_class(identifier));

    // Stored setting values land on the root as markup attributes.
    assert_eq!(hero.attr("title"), Some("Hello"));
    assert_eq!(collect_text(&hero), "Hello");
    Ok(())
}

#[tokio::test]
async fn test_layout_outside_container_is_locked() -> Result<()> {
    let session = EditSession::new(hero_page(), ScriptedServer::default())?;

    let tree = session.tree();
    let body = &tree.children[0];
    assert_eq!(body.tag, "body");
    assert!(!body.caps.any());

    let container = session.content_container().unwrap();
    assert!(container.caps.droppable);
    assert!(container.caps.hoverable);
    Ok(())
}

#[tokio::test]
async fn test_setting_update_round_trip() -> Result<()> {
    let server = ScriptedServer::default().respond_with(Ok(RenderedBlock {
        block_id: "hero".to_string(),
        fragment: vec![wrapper("hero", vec![heading("Updated")])],
    }));
    let mut session = EditSession::new(hero_page(), server)?;
    let hero_id = find_block_root(&session, "hero").id;

    let outcome = session
        .update_setting(&hero_id, "title", "Updated", EditMode::UserEdit)
        .await?;

    let selected = match outcome {
        UpdateOutcome::Completed { selected } => selected.unwrap(),
        other => panic!("unexpected outcome {other:?}"),
    };

    // The request carried the edited value.
    let requests = session.service().render_requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].blocks["hero"].settings["title"],
        "Updated".to_string()
    );

    // The refreshed root replaced the old one and was re-selected.
    let hero = find_block_root(&session, "hero");
    assert_eq!(hero.id, selected);
    assert_eq!(session.selection(), Some(selected.as_str()));
    assert_eq!(collect_text(&hero), "Updated");
    assert_eq!(hero.attr("title"), Some("Updated"));

    // The store committed the request payload's substate.
    let state = session.store().root_state("en", "hero").unwrap();
    assert_eq!(state.settings["title"], "Updated".to_string());

    assert!(!session.is_pending(&hero_id));
    Ok(())
}

#[tokio::test]
async fn test_failed_update_leaves_everything_untouched() -> Result<()> {
    let server = ScriptedServer::default()
        .respond_with(Err(RenderError::Request("500 internal error".to_string())));
    let mut session = EditSession::new(hero_page(), server)?;
    let hero_id = find_block_root(&session, "hero").id;
    session.select(Some(&hero_id));

    let tree_before = session.tree().clone();
    let state_before = session.store().snapshot("en");

    let result = session
        .update_setting(&hero_id, "title", "Updated", EditMode::UserEdit)
        .await;

    assert!(result.is_err());
    assert_eq!(session.tree(), &tree_before);
    assert_eq!(session.store().snapshot("en"), state_before);
    assert_eq!(session.selection(), Some(hero_id.as_str()));
    assert!(!session.is_pending(&hero_id));
    Ok(())
}

#[tokio::test]
async fn test_nested_block_refresh_resolves_outermost_ancestor() -> Result<()> {
    // outer (dynamic) > section > inner (dynamic) > p
    let inner = wrapper(
        "inner",
        vec![ComponentNode::element("p").with_children(vec![ComponentNode::text("Leaf")])],
    );
    let outer = wrapper(
        "outer",
        vec![ComponentNode::element("section").with_children(vec![inner])],
    );
    let rendered: RenderedBlocks = HashMap::from([("outer".to_string(), vec![outer.clone()])]);

    let page = PageLoad {
        page_id: "page-2".to_string(),
        layout: layout(),
        page_components: HashMap::from([("en".to_string(), vec![placeholder("outer")])]),
        rendered_blocks: HashMap::from([("en".to_string(), rendered)]),
        page_blocks: HashMap::new(),
        blocks: vec![],
        languages: vec!["en".to_string()],
        current_language: "en".to_string(),
    };

    let refreshed_inner = wrapper(
        "inner",
        vec![ComponentNode::element("p").with_children(vec![ComponentNode::text("Autumn")])],
    );
    let refreshed = wrapper(
        "outer",
        vec![ComponentNode::element("section").with_children(vec![refreshed_inner])],
    );
    let server = ScriptedServer::default().respond_with(Ok(RenderedBlock {
        block_id: "outer".to_string(),
        fragment: vec![refreshed],
    }));

    let mut session = EditSession::new(page, server)?;
    let inner_id = find_block_root(&session, "inner").id;

    let outcome = session
        .update_setting(&inner_id, "season", "Autumn", EditMode::UserEdit)
        .await?;

    // The edit was addressed through the outermost dynamic ancestor.
    let requests = session.service().render_requests.lock().unwrap().clone();
    assert_eq!(
        requests[0].blocks["outer"].blocks["inner"].settings["season"],
        "Autumn".to_string()
    );

    // Reselection descended the relative-id trail into the new fragment.
    let selected = match outcome {
        UpdateOutcome::Completed { selected } => selected.unwrap(),
        other => panic!("unexpected outcome {other:?}"),
    };
    let inner_root = find_block_root(&session, "inner");
    assert_eq!(inner_root.id, selected);
    assert_eq!(collect_text(&inner_root), "Autumn");

    let state = session.store().root_state("en", "outer").unwrap();
    assert_eq!(
        state.blocks["inner"].settings["season"],
        "Autumn".to_string()
    );
    Ok(())
}

#[tokio::test]
async fn test_language_switch_rebuilds_canvas() -> Result<()> {
    let mut page = hero_page();
    page.languages.push("nl".to_string());
    page.page_components
        .insert("nl".to_string(), vec![placeholder("hero")]);
    page.rendered_blocks.insert(
        "nl".to_string(),
        HashMap::from([("hero".to_string(), vec![wrapper("hero", vec![heading("Hallo")])])]),
    );
    page.page_blocks.insert(
        "nl".to_string(),
        HashMap::from([(
            "hero".to_string(),
            BlockState {
                settings: HashMap::from([("title".to_string(), "Hallo".to_string())]),
                blocks: HashMap::new(),
            },
        )]),
    );

    let mut session = EditSession::new(page, ScriptedServer::default())?;
    let hero_id = find_block_root(&session, "hero").id;
    session.select(Some(&hero_id));

    session.activate_language("nl")?;
    assert_eq!(session.current_language(), "nl");
    assert_eq!(session.selection(), None);
    let hero = find_block_root(&session, "hero");
    assert_eq!(collect_text(&hero), "Hallo");
    assert_eq!(hero.attr("title"), Some("Hallo"));

    // Switching back re-resolves from the pristine per-language maps.
    session.activate_language("en")?;
    let hero = find_block_root(&session, "hero");
    assert_eq!(collect_text(&hero), "Hello");
    Ok(())
}

#[tokio::test]
async fn test_selection_reports_settings_panel() -> Result<()> {
    let mut session = EditSession::new(hero_page(), ScriptedServer::default())?;
    let hero_id = find_block_root(&session, "hero").id;

    let info = session.select(Some(&hero_id));
    assert_eq!(info.panel, SelectionPanel::Settings);
    assert!(info.removable);
    assert!(info.copyable);

    let info = session.select(None);
    assert_eq!(info.panel, SelectionPanel::None);
    assert_eq!(session.selection(), None);
    Ok(())
}

#[tokio::test]
async fn test_drop_block_materializes_template() -> Result<()> {
    let mut page = hero_page();
    page.blocks.push(BlockDefinition {
        slug: "quote".to_string(),
        template: vec![ComponentNode::element(PLACEHOLDER_TAG)
            .with_attr(ATTR_BLOCK_ID, "quote")
            .with_attr(ATTR_BLOCK_SLUG, "quote")
            .with_attr(ATTR_IS_HTML, "true")
            .with_children(vec![ComponentNode::element("blockquote")
                .with_children(vec![ComponentNode::text("Stay hungry")])])],
        settings: vec![],
        is_html: true,
    });

    let mut session = EditSession::new(page, ScriptedServer::default())?;
    let container_id = session.content_container().unwrap().id.clone();

    let dropped = session.drop_block("quote", &container_id, 1)?.unwrap();

    let container = session.content_container().unwrap();
    assert_eq!(container.children.len(), 2);
    let quote = &container.children[1];
    assert_eq!(quote.id, dropped);
    // Single-root HTML block keeps its own markup as the root.
    assert_eq!(quote.tag, "blockquote");
    assert!(!quote.is_style_wrapper);
    assert!(quote.caps.removable);

    assert_eq!(session.drop_block("nope", &container_id, 0)?, None);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_block_remints_style_identity() -> Result<()> {
    let mut session = EditSession::new(hero_page(), ScriptedServer::default())?;
    let original = find_block_root(&session, "hero");

    let duplicate_id = session.duplicate_block(&original.id)?.unwrap();
    assert_ne!(duplicate_id, original.id);

    let container = session.content_container().unwrap();
    assert_eq!(container.children.len(), 2);
    let duplicate = &container.children[1];
    assert_eq!(duplicate.id, duplicate_id);
    assert_eq!(duplicate.block_slug.as_deref(), Some("hero"));

    let original_identifier = original.style_identifier.as_deref().unwrap();
    let duplicate_identifier = duplicate.style_identifier.as_deref().unwrap();
    assert_ne!(original_identifier, duplicate_identifier);
    assert!(is_style_identifier(duplicate_identifier));
    assert!(duplicate.has_class(duplicate_identifier));
    assert!(!duplicate.has_class(original_identifier));
    Ok(())
}

#[tokio::test]
async fn test_save_page_persists_serialized_content() -> Result<()> {
    let session = EditSession::new(hero_page(), ScriptedServer::default())?;

    session.save_page(".hero { color: red; }").await?;

    let persisted = session.service().persisted.lock().unwrap().clone();
    assert_eq!(persisted.len(), 1);
    let (html, style) = &persisted[0];
    assert!(html.contains("<h1>Hello</h1>"));
    assert_eq!(style, ".hero { color: red; }");
    Ok(())
}

#[tokio::test]
async fn test_page_payload_deserializes_from_wire_format() -> Result<()> {
    let payload = serde_json::json!({
        "page-id": "page-9",
        "layout": [{
            "tag": "body",
            "children": [{ "tag": "div", "attributes": { "phpb-content-container": "" } }]
        }],
        "page-components": {
            "en": [{ "tag": "phpb-block", "attributes": { "block-id": "hero" } }]
        },
        "rendered-blocks": {
            "en": {
                "hero": [{
                    "tag": "phpb-block",
                    "attributes": { "block-id": "hero", "block-slug": "hero" },
                    "children": [{ "tag": "h1", "children": [{ "tag": "", "text": "Hello" }] }]
                }]
            }
        },
        "page-blocks": {
            "en": { "hero": { "settings": { "title": "Hello" } } }
        },
        "blocks": [{
            "slug": "hero",
            "settings": [{ "name": "title", "type": "text", "default-value": "Welcome" }]
        }],
        "languages": ["en"],
        "current-language": "en"
    });

    let page: PageLoad = serde_json::from_value(payload)?;
    let session = EditSession::new(page, ScriptedServer::default())?;

    let hero = find_block_root(&session, "hero");
    assert_eq!(hero.attr("title"), Some("Hello"));
    assert_eq!(collect_text(&hero), "Hello");
    Ok(())
}

#[tokio::test]
async fn test_undo_reverts_setting_attribute() -> Result<()> {
    let server = ScriptedServer::default().respond_with(Ok(RenderedBlock {
        block_id: "hero".to_string(),
        fragment: vec![wrapper("hero", vec![heading("Updated")])],
    }));
    let mut session = EditSession::new(hero_page(), server)?;
    let hero_id = find_block_root(&session, "hero").id;

    session
        .update_setting(&hero_id, "title", "Updated", EditMode::UserEdit)
        .await?;
    let refreshed_id = find_block_root(&session, "hero").id;

    assert!(session.undo());
    let hero = find_block_root(&session, "hero");
    assert_eq!(hero.id, refreshed_id);
    assert_eq!(hero.attr("title"), Some("Hello"));

    assert!(session.redo());
    let hero = find_block_root(&session, "hero");
    assert_eq!(hero.attr("title"), Some("Updated"));
    Ok(())
}

#[tokio::test]
async fn test_undo_reverts_store_and_next_request_payload() -> Result<()> {
    let server = ScriptedServer::default()
        .respond_with(Ok(RenderedBlock {
            block_id: "hero".to_string(),
            fragment: vec![wrapper("hero", vec![heading("Updated")])],
        }))
        .respond_with(Ok(RenderedBlock {
            block_id: "hero".to_string(),
            fragment: vec![wrapper("hero", vec![heading("Updated")])],
        }));
    let mut session = EditSession::new(hero_page(), server)?;
    let hero_id = find_block_root(&session, "hero").id;

    session
        .update_setting(&hero_id, "title", "Updated", EditMode::UserEdit)
        .await?;

    // Undo and redo must keep the store in step with the canvas.
    assert!(session.undo());
    let state = session.store().root_state("en", "hero").unwrap();
    assert_eq!(state.settings.get("title").map(String::as_str), Some("Hello"));

    assert!(session.redo());
    let state = session.store().root_state("en", "hero").unwrap();
    assert_eq!(
        state.settings.get("title").map(String::as_str),
        Some("Updated")
    );

    // An unrelated edit after an undo serializes the undone value, not the
    // stale one.
    assert!(session.undo());
    let hero_id = find_block_root(&session, "hero").id;
    session
        .update_setting(&hero_id, "subtitle", "Now", EditMode::UserEdit)
        .await?;
    let requests = session.service().render_requests.lock().unwrap().clone();
    assert_eq!(
        requests[1].blocks["hero"].settings.get("title").map(String::as_str),
        Some("Hello")
    );
    Ok(())
}
