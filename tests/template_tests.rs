use cobalto_table::settings::TemplateSettings;
use cobalto_table::template;
use cobalto_table::template::*;
use cobalto_table::TableError;
use std::collections::HashMap;

#[test]
fn test_tokenize_basic() {
    let input = "Hello, {{ username }}! {% if user.is_admin %}Admin!{% endif %}";
    let tokens = tokenize_template(input);

    assert_eq!(tokens.len(), 6);
    match &tokens[1] {
        Token::Variable(var) => assert_eq!(var, "username"),
        _ => panic!("Expected variable token"),
    }
    match &tokens[2] {
        Token::Text(text) => assert_eq!(text, "! "),
        _ => panic!("Expected text token"),
    }
    match &tokens[3] {
        Token::Tag(tag) => assert_eq!(tag, "if user.is_admin"),
        _ => panic!("Expected tag token"),
    }
}

#[test]
fn test_parse_simple_nodes() {
    let input = "Welcome, {{user.name}}";
    let tokens = tokenize_template(input);
    let nodes = parse_tokens(&tokens);

    assert_eq!(nodes.len(), 2);
    match &nodes[1] {
        Node::Variable(var) => assert_eq!(var, "user.name"),
        _ => panic!("Expected variable node"),
    }
}

#[test]
fn test_render_nodes_escapes_variables() {
    let nodes = parse_tokens(&tokenize_template("{{ name }}|{{ name|safe }}"));
    let mut context = HashMap::new();
    context.insert("name".to_string(), TemplateValue::from("<b>Tom & Jerry</b>"));

    let rendered = template::render_nodes(&nodes, &context);
    assert_eq!(
        rendered,
        "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;|<b>Tom & Jerry</b>"
    );
}

#[test]
fn test_render_if_block_true() {
    let nodes = vec![Node::If {
        condition: "is_admin".to_string(),
        then_body: vec![Node::Text("Welcome admin!".to_string())],
        else_body: vec![Node::Text("Welcome user!".to_string())],
    }];
    let mut context = HashMap::new();
    context.insert("is_admin".to_string(), TemplateValue::Bool(true));
    let rendered = template::render_nodes(&nodes, &context);
    assert_eq!(rendered, "Welcome admin!");
}

#[test]
fn test_render_if_block_false_and_missing() {
    let nodes = parse_tokens(&tokenize_template(
        "{% if is_admin %}admin{% else %}user{% endif %}",
    ));
    let mut context = HashMap::new();
    context.insert("is_admin".to_string(), TemplateValue::Bool(false));
    assert_eq!(template::render_nodes(&nodes, &context), "user");
    assert_eq!(template::render_nodes(&nodes, &HashMap::new()), "user");
}

#[test]
fn test_if_truthiness_and_not() {
    let nodes = parse_tokens(&tokenize_template(
        "{% if url %}link{% endif %}{% if not items %}empty{% endif %}",
    ));
    let mut context = HashMap::new();
    context.insert("url".to_string(), TemplateValue::from("/users"));
    context.insert("items".to_string(), TemplateValue::List(Vec::new()));
    assert_eq!(template::render_nodes(&nodes, &context), "linkempty");

    context.insert("url".to_string(), TemplateValue::from(""));
    context.insert("items".to_string(), TemplateValue::from(vec!["a"]));
    assert_eq!(template::render_nodes(&nodes, &context), "");
}

#[test]
fn test_render_nested_for_loop() {
    let nodes = parse_tokens(&tokenize_template(
        "{% for row in rows %}[{% for cell in row.cells %}{{ cell }},{% endfor %}]{% endfor %}",
    ));
    let row = |cells: Vec<&str>| {
        let mut map = HashMap::new();
        map.insert("cells".to_string(), TemplateValue::from(cells));
        TemplateValue::Object(map)
    };
    let mut context = HashMap::new();
    context.insert(
        "rows".to_string(),
        TemplateValue::List(vec![row(vec!["a", "b"]), row(vec!["c"])]),
    );
    assert_eq!(template::render_nodes(&nodes, &context), "[a,b,][c,]");
}

#[test]
fn test_render_large_nested_loop() {
    let nodes = parse_tokens(&tokenize_template(
        "{% for row in rows %}<tr>{% for cell in row.cells %}<td>{{ cell }}</td>{% endfor %}</tr>{% endfor %}",
    ));
    let rows: Vec<TemplateValue> = (0..20_000)
        .map(|i| {
            let mut row = HashMap::new();
            row.insert(
                "cells".to_string(),
                TemplateValue::from(vec![format!("a{i}"), format!("b{i}")]),
            );
            TemplateValue::Object(row)
        })
        .collect();
    let mut context = HashMap::new();
    context.insert("rows".to_string(), TemplateValue::List(rows));

    let rendered = template::render_nodes(&nodes, &context);
    assert_eq!(rendered.matches("<tr>").count(), 20_000);
    assert!(rendered.starts_with("<tr><td>a0</td><td>b0</td></tr>"));
    assert!(rendered.ends_with("<tr><td>a19999</td><td>b19999</td></tr>"));
}

#[test]
fn test_loop_variable_shadows_and_restores() {
    let nodes = parse_tokens(&tokenize_template(
        "{{ item }}:{% for item in items %}{{ item }}{% endfor %}:{{ item }}",
    ));
    let mut context = HashMap::new();
    context.insert("item".to_string(), TemplateValue::from("outer"));
    context.insert("items".to_string(), TemplateValue::from(vec!["x", "y"]));
    assert_eq!(template::render_nodes(&nodes, &context), "outer:xy:outer");
}

#[test]
fn test_unknown_tag_is_skipped() {
    let tokens = vec![
        Token::Tag("unknown_tag whatisthis".into()),
        Token::Text("after".into()),
    ];
    let nodes = parse_tokens(&tokens);
    assert_eq!(nodes.len(), 1);
    assert!(matches!(&nodes[0], Node::Text(t) if t == "after"));
}

#[test]
fn test_builtin_results_template() {
    let mut result = HashMap::new();
    result.insert("title".to_string(), TemplateValue::from("Total"));
    result.insert("html".to_string(), TemplateValue::from("<em>42</em>"));
    result.insert("has_colspan".to_string(), TemplateValue::Bool(true));
    result.insert("colspan".to_string(), TemplateValue::from(3usize));
    let mut context = HashMap::new();
    context.insert(
        "results".to_string(),
        TemplateValue::List(vec![TemplateValue::Object(result)]),
    );

    let html = render_template("results.html", &context, &TemplateSettings::default()).unwrap();
    assert!(html.contains(r#"colspan="3""#));
    assert!(html.contains("<strong>Total</strong>"));
    assert!(html.contains("<em>42</em>"));
}

#[test]
fn test_override_dir_with_extends_and_include() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base.html"),
        "<section>{% block content %}Base{% endblock %}</section>{% include \"footer.html\" %}",
    )
    .unwrap();
    std::fs::write(dir.path().join("footer.html"), "<footer>{{ note }}</footer>").unwrap();
    std::fs::write(
        dir.path().join("tbody.html"),
        "{% extends \"base.html\" %}{% block content %}Hello {{ name }}{% endblock %}",
    )
    .unwrap();

    let settings = TemplateSettings {
        dir: Some(dir.path().to_string_lossy().to_string()),
    };
    let mut context = HashMap::new();
    context.insert("name".to_string(), TemplateValue::from("Ada"));
    context.insert("note".to_string(), TemplateValue::from("bye"));

    let html = render_template("tbody.html", &context, &settings).unwrap();
    assert_eq!(html, "<section>Hello Ada</section><footer>bye</footer>");

    // Templates missing from the override dir come from the bundled set.
    let thead = load_template_source("thead.html", &settings).unwrap();
    assert!(thead.contains("<thead>"));
}

#[test]
fn test_template_not_found() {
    let err = render_template(
        "hopefully_does_not_exist_zzz999.html",
        &HashMap::new(),
        &TemplateSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TableError::TemplateNotFound { name } if name == "hopefully_does_not_exist_zzz999.html"));
}

#[test]
fn test_template_logging_coverage() {
    set_display_logs(true);
    // Any rendering or parsing will trigger tdebug! branches.
    assert!(render_template("results.html", &HashMap::new(), &TemplateSettings::default()).is_ok());
    set_display_logs(false); // for cleanup
}
