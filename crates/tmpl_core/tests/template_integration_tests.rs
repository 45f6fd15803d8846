//! Integration tests for the template engine.

use std::fs;
use std::path::PathBuf;

use tmpl_core::{
    MarkerSet, MissingVariablePolicy, Template, TemplateConfig, TemplateError, TemplateLoader,
};
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_page_structure() {
    let template = Template::from_file(fixture("page.html")).unwrap();

    assert_eq!(
        template.variables().collect::<Vec<_>>(),
        vec!["lang", "title", "head", "body"]
    );
    assert_eq!(
        template.sub_template_names().collect::<Vec<_>>(),
        vec!["javascript", "stylesheet", "table"]
    );
    assert!(!template.clean_body().contains("BEGIN_TEMPLATE"));
    assert!(!template.clean_body().contains("<link"));

    let table = template.sub_template("table").unwrap();
    assert_eq!(table.clean_body(), "<table>@-{rows}-@</table>");
    assert_eq!(table.sub_template_names().collect::<Vec<_>>(), vec!["row"]);

    let row = table.sub_template("row").unwrap();
    assert_eq!(row.variables().collect::<Vec<_>>(), vec!["cell", "cell2"]);
    assert!(!template.has_variable("cell"));
}

#[test]
fn test_page_composition() {
    let mut page = Template::from_file(fixture("page.html")).unwrap();

    page.set_variable("title", "Page Title")
        .unwrap()
        .set_variable("lang", "en")
        .unwrap();

    let stylesheet = page.get_sub_template("stylesheet").unwrap();
    stylesheet.set_variable("href", "style.css").unwrap();
    let link = stylesheet.render().unwrap();
    page.set_variable("head", link).unwrap();

    let javascript = page.get_sub_template("javascript").unwrap();
    javascript.set_variable("src", "app.js").unwrap();
    let script = javascript.render().unwrap();
    page.append_variable("head", script).unwrap();

    let table = page.get_sub_template("table").unwrap();
    let mut rows = String::new();
    for i in 0..3 {
        let row = table.get_sub_template("row").unwrap();
        row.set_variable("cell", i.to_string())
            .unwrap()
            .set_variable("cell2", "x")
            .unwrap();
        rows.push_str(&row.render().unwrap());
    }
    table.set_variable("rows", rows).unwrap();
    let body = table.render().unwrap();
    page.set_variable("body", body).unwrap();

    let html = page.render().unwrap();
    assert!(html.contains("<html lang=\"en\">"));
    assert!(html.contains("<title>Page Title</title>"));
    assert!(html.contains(
        "<link rel=\"stylesheet\" href=\"style.css\"><script src=\"app.js\"></script>"
    ));
    assert!(html.contains(
        "<table><tr><td>0</td><td>x</td><td>0</td></tr>\
         <tr><td>1</td><td>x</td><td>1</td></tr>\
         <tr><td>2</td><td>x</td><td>2</td></tr></table>"
    ));
    assert!(!html.contains("@-{"));
    assert!(!html.contains("<!--@@"));
}

#[test]
fn test_nested_fixture_ownership() {
    let template = Template::from_file(fixture("nested.html")).unwrap();

    assert_eq!(
        template.clean_body(),
        "<html>\n<nav>@-{menu}-@</nav>\n<main>@-{content}-@</main>\n\n</html>\n"
    );
    assert_eq!(
        template.sub_template_names().collect::<Vec<_>>(),
        vec!["menu", "notice"]
    );

    let menu = template.sub_template("menu").unwrap();
    assert_eq!(menu.clean_body(), "<ul>@-{sections}-@</ul>");
    assert_eq!(
        menu.sub_template_names().collect::<Vec<_>>(),
        vec!["divider", "section"]
    );

    let section = menu.sub_template("section").unwrap();
    assert_eq!(
        section.clean_body(),
        "<li>@-{heading}-@<ol>@-{links}-@</ol></li>"
    );
    assert_eq!(section.sub_template_names().collect::<Vec<_>>(), vec!["link"]);

    let link = section.sub_template("link").unwrap();
    assert_eq!(link.clean_body(), "<a href=\"@-{href}-@\">@-{label}-@</a>");
    assert_eq!(link.sub_template_names().count(), 0);

    let divider = menu.sub_template("divider").unwrap();
    assert_eq!(divider.clean_body(), "<li class=\"divider\"></li>");
    assert_eq!(divider.sub_template_names().count(), 0);

    let notice = template.sub_template("notice").unwrap();
    assert_eq!(notice.clean_body(), "<p class=\"notice\">@-{message}-@</p>");
    assert_eq!(notice.sub_template_names().count(), 0);
}

#[test]
fn test_nested_fixture_composition() {
    let mut page = Template::from_file(fixture("nested.html")).unwrap();
    page.set_variable("content", "hello").unwrap();

    let menu = page.get_sub_template("menu").unwrap();
    let section = menu.get_sub_template("section").unwrap();
    let link = section.get_sub_template("link").unwrap();
    link.set_variable("href", "/a").unwrap().set_variable("label", "A").unwrap();
    let links = link.render().unwrap();
    section
        .set_variable("heading", "Docs")
        .unwrap()
        .set_variable("links", links)
        .unwrap();
    let mut sections = section.render().unwrap();
    sections.push_str(&menu.get_sub_template("divider").unwrap().render().unwrap());
    menu.set_variable("sections", sections).unwrap();
    let nav = menu.render().unwrap();
    page.set_variable("menu", nav).unwrap();

    assert_eq!(
        page.render().unwrap(),
        "<html>\n<nav><ul><li>Docs<ol><a href=\"/a\">A</a></ol></li>\
         <li class=\"divider\"></li></ul></nav>\n<main>hello</main>\n\n</html>\n"
    );
}

#[test]
fn test_ignore_block_with_nested_template() {
    let mut template = Template::parse(
        "<ul><!--@@ BEGIN_IGNORE AS slot @@-->\
         <li>sample</li>\
         <!--@@ BEGIN_TEMPLATE row @@--><li>@-{label}-@</li><!--@@ END_TEMPLATE row @@-->\
         <!--@@ END_IGNORE @@--></ul>",
    )
    .unwrap();

    assert_eq!(template.clean_body(), "<ul>@-{slot}-@</ul>");
    assert_eq!(template.variables().collect::<Vec<_>>(), vec!["slot"]);
    assert!(!template.clean_body().contains("sample"));

    let row = template.get_sub_template("row").unwrap();
    assert_eq!(row.variables().collect::<Vec<_>>(), vec!["label"]);
}

#[test]
fn test_top_level_template_scenario() {
    let mut template =
        Template::parse("<!--@@ BEGIN_TEMPLATE row @@-->X@-{cell}-@Y<!--@@ END_TEMPLATE @@-->")
            .unwrap();

    let row = template.get_sub_template("row").unwrap();
    row.set_variable("cell", "5").unwrap();
    assert_eq!(row.render().unwrap(), "X5Y");
}

#[test]
fn test_round_trip_replaces_each_occurrence() {
    let source = "<a href=\"@-{url}-@\">@-{text}-@</a> (@-{url}-@)";
    let mut template = Template::parse(source).unwrap();
    let names: Vec<String> = template.variables().map(str::to_string).collect();
    for name in &names {
        template.set_variable(name, "V").unwrap();
    }

    assert_eq!(template.render().unwrap(), "<a href=\"V\">V</a> (V)");
}

#[test]
fn test_append_concatenates() {
    let mut template = Template::parse("<p>@-{x}-@</p>").unwrap();
    template.set_variable("x", "a").unwrap();
    template.append_variable("x", "b").unwrap();
    assert_eq!(template.render().unwrap(), "<p>ab</p>");
    assert_eq!(template.render().unwrap(), "<p>ab</p>");
}

#[test]
fn test_errors_carry_names() {
    let mut template = Template::parse("@-{a}-@").unwrap();

    match template.set_variable("b", "x") {
        Err(TemplateError::UnknownVariable(name)) => assert_eq!(name, "b"),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    match template.get_sub_template("missing") {
        Err(TemplateError::UnknownSubTemplate(name)) => assert_eq!(name, "missing"),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
    match template.render() {
        Err(TemplateError::UnboundVariable(name)) => assert_eq!(name, "a"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_empty_inputs_rejected() {
    assert!(matches!(
        Template::parse("").unwrap_err(),
        TemplateError::InvalidInput(_)
    ));

    let err = Template::from_file("missing-template.html").unwrap_err();
    assert!(matches!(err, TemplateError::InvalidInput(_)));
    assert!(err.to_string().contains("missing-template.html"));

    let err = Template::parse(
        "<!--@@ BEGIN_IGNORE @@--><!--@@ BEGIN_TEMPLATE row @@-->  <!--@@ END_TEMPLATE row @@--><!--@@ END_IGNORE @@-->x",
    )
    .unwrap_err();
    assert!(err.to_string().contains("row"));
}

#[test]
fn test_child_ignore_blocks_scoped_by_name() {
    // `item` picks up the ignore block tagged with its own name.
    let template = Template::parse(
        "<!--@@ BEGIN_IGNORE @@-->\
         <!--@@ BEGIN_TEMPLATE item @@--><div>@-{a}-@\
         <!--@@ BEGIN_IGNORE item AS extra @@-->demo<!--@@ END_IGNORE item @@-->\
         </div><!--@@ END_TEMPLATE item @@-->\
         <!--@@ END_IGNORE @@-->root",
    )
    .unwrap();

    assert_eq!(template.clean_body(), "root");
    let item = template.sub_template("item").unwrap();
    assert_eq!(item.clean_body(), "<div>@-{a}-@@-{extra}-@</div>");
    assert_eq!(item.variables().collect::<Vec<_>>(), vec!["a", "extra"]);
}

#[test]
fn test_custom_markers_from_config_file() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("tmpl.toml");
    fs::write(
        &config_path,
        r##"
missing_variable_policy = "literal"

[markers]
command_start = "{#"
command_end = "#}"
variable_start = "{{"
variable_end = "}}"
"##,
    )
    .unwrap();
    let template_path = temp.path().join("page.txt");
    fs::write(
        &template_path,
        "Hi {{name}}{# BEGIN_IGNORE AS list #}{# BEGIN_TEMPLATE item #}- {{v}}{# END_TEMPLATE item #}{# END_IGNORE #} {{later}}",
    )
    .unwrap();

    let config = TemplateConfig::from_file(&config_path).unwrap();
    let loader = TemplateLoader::new(config).unwrap();
    let mut template = loader.load_file(&template_path).unwrap();

    assert_eq!(
        template.variables().collect::<Vec<_>>(),
        vec!["name", "list", "later"]
    );
    template.set_variable("name", "Ann").unwrap();
    template.set_variable("list", "").unwrap();
    assert_eq!(template.render().unwrap(), "Hi Ann {{later}}");
    assert_eq!(template.markers().variable_start, "{{");
    assert!(template.has_sub_template("item"));
}

#[test]
fn test_config_builder() {
    let markers = MarkerSet {
        separator: "INTO".to_string(),
        ..MarkerSet::default()
    };
    let config = TemplateConfig::new()
        .with_markers(markers)
        .with_missing_variable_policy(MissingVariablePolicy::Empty);

    let template = Template::parse_with(
        "[<!--@@ BEGIN_IGNORE INTO slot @@-->x<!--@@ END_IGNORE @@-->]",
        &config,
    )
    .unwrap();
    assert_eq!(template.variables().collect::<Vec<_>>(), vec!["slot"]);
    assert_eq!(template.render().unwrap(), "[]");
}

#[test]
fn test_clone_is_independent() {
    let mut original = Template::parse("@-{x}-@").unwrap();
    original.set_variable("x", "1").unwrap();

    let mut copy = original.clone();
    copy.set_variable("x", "2").unwrap();

    assert_eq!(original.render().unwrap(), "1");
    assert_eq!(copy.render().unwrap(), "2");
}

#[test]
fn test_template_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Template>();
}
