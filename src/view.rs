//! HTML rendering of a configured table.

use crate::error::Result;
use crate::orm::Model;
use crate::routes::{RouteAction, with_query};
use crate::sort::SortDirection;
use crate::table::{Table, TableState};
use crate::template::{Context, TemplateValue, escape_html, render_template};
use std::collections::HashMap;

fn object(entries: Vec<(&str, TemplateValue)>) -> TemplateValue {
    TemplateValue::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

fn hidden_inputs(params: Vec<(String, String)>) -> TemplateValue {
    TemplateValue::List(
        params
            .into_iter()
            .map(|(name, value)| object(vec![("name", name.into()), ("value", value.into())]))
            .collect(),
    )
}

impl<M: Model> Table<M> {
    /// Whole table: toolbar, headers, rows, results and navigation.
    pub fn html(&self) -> Result<String> {
        self.render("table.html")
    }

    pub fn thead_html(&self) -> Result<String> {
        self.render("thead.html")
    }

    /// Rows followed by the result rows.
    pub fn tbody_html(&self) -> Result<String> {
        self.render("tbody.html")
    }

    pub fn results_html(&self) -> Result<String> {
        self.render("results.html")
    }

    pub fn tfoot_html(&self) -> Result<String> {
        self.render("tfoot.html")
    }

    fn render(&self, template: &str) -> Result<String> {
        let context = self.context()?;
        render_template(template, &context, &self.settings.template)
    }

    /// Query parameters shared by links, in link order. `skip` drops one of them.
    fn link_params(&self, state: &TableState<M>, skip: Option<&str>) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(rows) = state.paginator.per_page() {
            params.push((self.rows_number_field(), rows.to_string()));
        }
        if let Some(search) = &state.search {
            params.push((self.search_field(), search.clone()));
        }
        if let Some(field) = &state.sort.field {
            params.push((self.sort_by_field(), field.clone()));
            params.push((self.sort_dir_field(), state.sort.direction.to_string()));
        }
        if let Some(skip) = skip {
            params.retain(|(key, _)| key != skip);
        }
        params
    }

    fn sort_url(&self, index: &str, state: &TableState<M>, field: &str) -> Result<String> {
        let direction = match state.sort.field.as_deref() {
            Some(current) if current == field => state.sort.direction.toggle(),
            _ => SortDirection::Asc,
        };
        let (sort_by, sort_dir) = (self.sort_by_field(), self.sort_dir_field());
        let mut params = self.link_params(state, None);
        params.retain(|(key, _)| *key != sort_by && *key != sort_dir);
        params.push((sort_by, field.to_string()));
        params.push((sort_dir, direction.to_string()));
        params.extend(self.appended.iter().cloned());
        with_query(index, &params)
    }

    fn page_url(&self, index: &str, state: &TableState<M>, page: u32) -> Result<String> {
        let mut params = self.link_params(state, None);
        params.push((self.page_field(), page.to_string()));
        params.extend(self.appended.iter().cloned());
        with_query(index, &params)
    }

    fn columns_context(&self, index: &str, state: &TableState<M>) -> Result<TemplateValue> {
        let icons = &self.settings.icons;
        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let mut entry: Vec<(&str, TemplateValue)> = vec![
                ("title", column.title().into()),
                ("sortable", column.is_sortable().into()),
            ];
            if let (true, Some(field)) = (column.is_sortable(), column.db_field()) {
                let icon = match state.sort.field.as_deref() {
                    Some(current) if current == field => match state.sort.direction {
                        SortDirection::Asc => &icons.sort_asc,
                        SortDirection::Desc => &icons.sort_desc,
                    },
                    _ => &icons.sort,
                };
                entry.push(("sort_url", self.sort_url(index, state, field)?.into()));
                entry.push(("sort_icon", icon.as_str().into()));
            }
            columns.push(object(entry));
        }
        Ok(TemplateValue::List(columns))
    }

    fn row_actions(&self, values: &serde_json::Map<String, serde_json::Value>) -> String {
        let icons = &self.settings.icons;
        let mut actions = Vec::new();
        if let Some(url) = self.routes.url_for_row(RouteAction::Show, values) {
            actions.push(format!(
                r#"<a href="{}" class="btn btn-link p-0 text-primary" title="Show">{}</a>"#,
                escape_html(&url),
                icons.show
            ));
        }
        if let Some(url) = self.routes.url_for_row(RouteAction::Edit, values) {
            actions.push(format!(
                r#"<a href="{}" class="btn btn-link p-0 text-primary" title="Edit">{}</a>"#,
                escape_html(&url),
                icons.edit
            ));
        }
        if let Some(url) = self.routes.url_for_row(RouteAction::Destroy, values) {
            actions.push(format!(
                r#"<form method="POST" action="{}" class="d-inline"><input type="hidden" name="_method" value="DELETE"><button type="submit" class="btn btn-link p-0 text-danger" title="Destroy">{}</button></form>"#,
                escape_html(&url),
                icons.destroy
            ));
        }
        actions.join(" ")
    }

    fn rows_context(&self, state: &TableState<M>) -> TemplateValue {
        let rows = state
            .paginator
            .items()
            .iter()
            .zip(&state.values)
            .map(|(row, values)| {
                let mut classes = vec![self.settings.classes.tr.clone()];
                classes.extend(
                    self.row_classes
                        .iter()
                        .filter(|rule| (rule.condition)(row))
                        .map(|rule| rule.classes.clone()),
                );
                classes.retain(|class| !class.is_empty());
                let cells: Vec<TemplateValue> = self
                    .columns
                    .iter()
                    .map(|column| column.render_cell(row, values).into())
                    .collect();
                object(vec![
                    ("classes", classes.join(" ").into()),
                    ("cells", TemplateValue::List(cells)),
                    ("actions", self.row_actions(values).into()),
                ])
            })
            .collect();
        TemplateValue::List(rows)
    }

    fn results_context(&self, state: &TableState<M>) -> TemplateValue {
        TemplateValue::List(
            state
                .result_rows
                .iter()
                .map(|result| {
                    object(vec![
                        ("title", result.title.clone().into()),
                        ("html", result.html.clone().into()),
                        ("has_colspan", result.colspan.is_some().into()),
                        ("colspan", result.colspan.unwrap_or(1).into()),
                    ])
                })
                .collect(),
        )
    }

    fn navigation_context(
        &self,
        index: &str,
        state: &TableState<M>,
    ) -> Result<(String, TemplateValue)> {
        let paginator = &state.paginator;
        let status = match (paginator.first_item(), paginator.last_item()) {
            (Some(first), Some(last)) => format!(
                "Showing entries {} to {} of {}",
                first,
                last,
                paginator.total()
            ),
            _ => format!("Showing 0 entries of {}", paginator.total()),
        };
        let mut links = Vec::new();
        for link in paginator.links() {
            let url = match link.page {
                Some(page) => self.page_url(index, state, page)?,
                None => String::new(),
            };
            links.push(object(vec![
                ("label", link.label.clone().into()),
                ("url", url.into()),
                ("active", link.active.into()),
                ("disabled", link.is_disabled().into()),
            ]));
        }
        Ok((status, TemplateValue::List(links)))
    }

    fn settings_context(&self) -> (TemplateValue, TemplateValue) {
        let classes = &self.settings.classes;
        let icons = &self.settings.icons;
        (
            object(vec![
                ("container", classes.container.as_str().into()),
                ("table", classes.table.as_str().into()),
                ("tr", classes.tr.as_str().into()),
                ("th", classes.th.as_str().into()),
                ("td", classes.td.as_str().into()),
                ("results", classes.results.as_str().into()),
            ]),
            object(vec![
                ("rows_number", icons.rows_number.as_str().into()),
                ("sort", icons.sort.as_str().into()),
                ("sort_asc", icons.sort_asc.as_str().into()),
                ("sort_desc", icons.sort_desc.as_str().into()),
                ("search", icons.search.as_str().into()),
                ("info", icons.info.as_str().into()),
                ("create", icons.create.as_str().into()),
                ("edit", icons.edit.as_str().into()),
                ("destroy", icons.destroy.as_str().into()),
                ("show", icons.show.as_str().into()),
            ]),
        )
    }

    /// Template context of a configured table.
    pub fn context(&self) -> Result<Context> {
        let state = self.state()?;
        let index = self.routes.index().unwrap_or_default();
        let colspan = self.colspan();
        let searchable = self.columns.iter().any(|c| c.is_searchable());
        let rows_number_selection =
            self.rows_number_selection && state.paginator.per_page().is_some();
        let create_url = self
            .routes
            .get(RouteAction::Create)
            .unwrap_or_default()
            .to_string();
        let search_placeholder = {
            let titles: Vec<String> = self
                .searchable_columns()
                .iter()
                .map(|c| c.title())
                .collect();
            format!("Search by: {}", titles.join(", "))
        };

        let mut search_hidden = self.link_params(state, Some(&self.search_field()));
        search_hidden.extend(self.appended.iter().cloned());
        let mut rows_hidden = self.link_params(state, Some(&self.rows_number_field()));
        rows_hidden.extend(self.appended.iter().cloned());

        let (navigation_status, page_links) = self.navigation_context(index, state)?;
        let (classes, icons) = self.settings_context();

        let mut context: Context = HashMap::new();
        context.insert("classes".into(), classes);
        context.insert("icons".into(), icons);
        context.insert("index_url".into(), index.into());
        context.insert(
            "show_toolbar".into(),
            (searchable || rows_number_selection || !create_url.is_empty()).into(),
        );
        context.insert("searchable".into(), searchable.into());
        context.insert("search_field".into(), self.search_field().into());
        context.insert(
            "search".into(),
            state.search.clone().unwrap_or_default().into(),
        );
        context.insert("search_placeholder".into(), search_placeholder.into());
        context.insert("search_hidden".into(), hidden_inputs(search_hidden));
        context.insert("rows_number_selection".into(), rows_number_selection.into());
        context.insert("rows_field".into(), self.rows_number_field().into());
        context.insert(
            "rows_number".into(),
            state
                .paginator
                .per_page()
                .map(|rows| rows.to_string())
                .unwrap_or_default()
                .into(),
        );
        context.insert("rows_hidden".into(), hidden_inputs(rows_hidden));
        context.insert("create_url".into(), create_url.into());
        context.insert("columns".into(), self.columns_context(index, state)?);
        context.insert("has_actions".into(), self.has_actions().into());
        context.insert("has_colspan".into(), colspan.is_some().into());
        context.insert("colspan".into(), colspan.unwrap_or(1).into());
        context.insert(
            "has_rows".into(),
            (!state.paginator.items().is_empty()).into(),
        );
        context.insert("rows".into(), self.rows_context(state));
        context.insert("results".into(), self.results_context(state));
        context.insert("navigation_status".into(), navigation_status.into());
        context.insert("has_pages".into(), state.paginator.has_pages().into());
        context.insert("page_links".into(), page_links);
        Ok(context)
    }
}
