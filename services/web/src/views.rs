use std::convert::Infallible;
use std::fmt::Write as _;
use topsis_form::footer::{escape_html, Footer};
use topsis_form::form::{FormController, Lifecycle};
use topsis_form::results::{cell_text, columns_of, ResultRow, ResultSink};

use crate::infra::SessionId;

/// Renders result rows as a bootstrap table.
#[derive(Debug, Default)]
pub(crate) struct HtmlTableSink {
    pub(crate) html: String,
}

impl ResultSink for HtmlTableSink {
    type Error = Infallible;

    fn display(&mut self, rows: Vec<ResultRow>) -> Result<(), Self::Error> {
        let columns = columns_of(&rows);
        self.html
            .push_str("<div class=\"table-responsive\"><table class=\"table table-bordered table-striped\"><thead><tr>");
        for column in &columns {
            write!(self.html, "<th>{}</th>", escape_html(column)).expect("header cell");
        }
        self.html.push_str("</tr></thead><tbody>");
        for row in &rows {
            self.html.push_str("<tr>");
            for column in &columns {
                write!(
                    self.html,
                    "<td>{}</td>",
                    escape_html(&cell_text(row.get(column)))
                )
                .expect("body cell");
            }
            self.html.push_str("</tr>");
        }
        self.html.push_str("</tbody></table></div>");
        Ok(())
    }
}

pub(crate) fn render_page(
    session: SessionId,
    form: &FormController,
    footer: &Footer,
    notice: Option<&str>,
) -> String {
    let fields = form.fields();
    let base = format!("/sessions/{session}");
    let mut html = String::new();

    html.push_str("<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>TOPSIS</title></head><body><main class=\"container mt-4\">");
    html.push_str("<div class=\"card p-4 shadow\">");
    writeln!(
        html,
        "<form method=\"post\" action=\"{base}/submit\" enctype=\"multipart/form-data\">"
    )
    .expect("form open");

    html.push_str("<div class=\"mb-3\"><label class=\"form-label\">Upload CSV File</label>");
    match &fields.file {
        Some(file) => {
            write!(
                html,
                "<input type=\"file\" name=\"file\" class=\"form-control\" accept=\".csv,text/csv\"><div class=\"form-text\">Current file: {}</div>",
                escape_html(&file.file_name)
            )
            .expect("file input");
        }
        None => html.push_str(
            "<input type=\"file\" name=\"file\" class=\"form-control\" accept=\".csv,text/csv\" required>",
        ),
    }
    html.push_str("</div>");

    write!(
        html,
        "<div class=\"mb-3\"><label class=\"form-label\">Weights (comma separated)</label><input type=\"text\" name=\"weights\" class=\"form-control\" placeholder=\"1,1,1,1\" value=\"{}\" required></div>",
        escape_html(&fields.weights)
    )
    .expect("weights input");
    write!(
        html,
        "<div class=\"mb-3\"><label class=\"form-label\">Impacts (comma separated)</label><input type=\"text\" name=\"impacts\" class=\"form-control\" placeholder=\"+,+,-,+\" value=\"{}\" required></div>",
        escape_html(&fields.impacts)
    )
    .expect("impacts input");

    let send_mail = form.email_field_visible();
    write!(
        html,
        "<input type=\"hidden\" name=\"send_mail\" value=\"{send_mail}\"><div class=\"form-check mb-3\"><span class=\"form-check-label\">Send result to email: {}</span> <button type=\"submit\" class=\"btn btn-link btn-sm\" formaction=\"{base}/send-mail\" formnovalidate name=\"toggle_send_mail\" value=\"{}\">{}</button></div>",
        if send_mail { "on" } else { "off" },
        !send_mail,
        if send_mail { "Turn off" } else { "Turn on" },
    )
    .expect("send mail toggle");

    if send_mail {
        write!(
            html,
            "<div class=\"mb-3\"><input type=\"email\" name=\"email\" class=\"form-control\" placeholder=\"Enter email address\" value=\"{}\" required></div>",
            escape_html(&fields.email)
        )
        .expect("email input");
    }

    if let Some(message) = notice.or_else(|| form.lifecycle().error()) {
        write!(
            html,
            "<div class=\"alert alert-danger\">{}</div>",
            escape_html(message)
        )
        .expect("error alert");
    }

    let (disabled, label) = if form.submit_disabled() {
        (" disabled", "Processing...")
    } else {
        ("", "Calculate TOPSIS")
    };
    write!(
        html,
        "<div class=\"d-grid gap-2\"><button type=\"submit\" class=\"btn btn-primary\"{disabled}>{label}</button><button type=\"submit\" class=\"btn btn-outline-secondary\" formaction=\"{base}/reset\" formnovalidate>Reset</button></div>"
    )
    .expect("buttons");
    html.push_str("</form>");

    if let Lifecycle::Succeeded(table) = form.lifecycle() {
        let mut sink = HtmlTableSink::default();
        let shown = match form.present(&mut sink) {
            Ok(shown) => shown,
            Err(never) => match never {},
        };
        if shown && !table.is_empty() {
            html.push_str("<hr><h5 class=\"text-center\">Result</h5>");
            html.push_str(&sink.html);
            if let Some(link) = &table.download {
                write!(
                    html,
                    "<p class=\"text-center\"><a href=\"{}\">Download CSV</a></p>",
                    escape_html(link)
                )
                .expect("download link");
            }
        }
    }

    html.push_str("</div>");
    html.push_str(&footer.render_html());
    html.push_str("</main></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use topsis_form::config::FooterConfig;
    use topsis_form::form::{FormFields, UploadFile};
    use topsis_form::results::ResultTable;

    fn footer() -> Footer {
        Footer::new(&FooterConfig::default(), 2026)
    }

    #[test]
    fn idle_form_hides_email_and_requires_file() {
        let form = FormController::new();
        let page = render_page(1, &form, &footer(), None);
        assert!(page.contains("name=\"file\" class=\"form-control\" accept=\".csv,text/csv\" required"));
        assert!(!page.contains("type=\"email\""));
        assert!(page.contains("Calculate TOPSIS"));
        assert!(page.contains("© 2026 All rights reserved"));
    }

    #[test]
    fn loading_form_disables_submit() {
        let mut form = FormController::new();
        form.on_submit(FormFields {
            file: Some(UploadFile::new("a.csv", None, b"x,y\n".to_vec())),
            weights: "1".to_string(),
            impacts: "+".to_string(),
            ..FormFields::default()
        })
        .expect("accepted");
        let page = render_page(1, &form, &footer(), None);
        assert!(page.contains("btn-primary\" disabled>Processing..."));
        assert!(page.contains("Current file: a.csv"));
    }

    #[test]
    fn table_cells_are_escaped() {
        let mut sink = HtmlTableSink::default();
        let row = json!({"Fund": "<M1>", "Rank": 1})
            .as_object()
            .cloned()
            .expect("object");
        sink.display(ResultTable::new(vec![row]).rows)
            .expect("infallible");
        assert_eq!(
            sink.html,
            "<div class=\"table-responsive\"><table class=\"table table-bordered table-striped\"><thead><tr><th>Fund</th><th>Rank</th></tr></thead><tbody><tr><td>&lt;M1&gt;</td><td>1</td></tr></tbody></table></div>"
        );
    }
}
