use crate::category_request::{ACTIVE_IDS_FIELD, INACTIVE_IDS_FIELD, POPUP_STATUS_FIELD};
use crate::language::sprintf;
use crate::manage_categories::CategoryPage;
use crate::services::{DataBag, MAX_NAME_LEN};
use crate::templates::{escape_html, trim_label};
use crate::view_state::ViewFilter;
use std::fmt::Write;

const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];
/// Names longer than this are shortened in the table.
const NAME_DISPLAY_LEN: usize = 50;
const CHECK_ROWS_JS: &str =
    "this.closest('form').querySelectorAll('tbody input[type=checkbox]').forEach(box => box.checked = ";

pub fn render_category_page(page: &CategoryPage, txt: &DataBag, scripturl: &str) -> String {
    let url = escape_html(scripturl);
    let mut html = String::new();
    writeln!(
        html,
        "<section class=\"reporting_categories\"><h2>{}</h2>",
        escape_html(&txt.text("category_title"))
    )
    .ok();

    if let Some(status) = &page.status {
        writeln!(
            html,
            "<div class=\"status_message\">{}</div>",
            escape_html(status)
        )
        .ok();
    }

    render_filter(&mut html, page, txt, &url);
    render_create_form(&mut html, page, txt, &url);
    render_table(&mut html, page, txt, &url);
    render_pager(&mut html, page, txt, &url);
    if let Some(target) = &page.rename_target {
        writeln!(
            html,
            "<div id=\"rename_popup\" class=\"popup\" data-category-id=\"{}\" data-status-field=\"{}\"><h3>{}</h3><input type=\"text\" name=\"category_name\" maxlength=\"{}\" value=\"{}\"><button type=\"button\" class=\"rename_save\">{}</button> <a href=\"{}\" class=\"popup_cancel\">{}</a></div>",
            target.id,
            POPUP_STATUS_FIELD,
            escape_html(&txt.text("rename_popup_title")),
            MAX_NAME_LEN,
            escape_html(&target.name),
            escape_html(&txt.text("rename_save")),
            url,
            escape_html(&txt.text("cancel"))
        )
        .ok();
    }

    writeln!(
        html,
        "<p class=\"note\">{}</p></section>",
        escape_html(&sprintf(
            &txt.text("active_limit_note"),
            &[
                page.active_limit.to_string().as_str(),
                page.active_count.to_string().as_str(),
            ]
        ))
    )
    .ok();
    html
}

fn render_filter(html: &mut String, page: &CategoryPage, txt: &DataBag, url: &str) {
    writeln!(
        html,
        "<form method=\"get\" action=\"{}\" class=\"view_filter\"><label>{} <select name=\"show\" onchange=\"this.form.submit()\">",
        url,
        escape_html(&txt.text("show_label"))
    )
    .ok();
    for filter in ViewFilter::ALL {
        writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            filter.as_str(),
            if filter == page.filter { " selected" } else { "" },
            escape_html(&txt.text(&format!("show_{}", filter.as_str())))
        )
        .ok();
    }
    html.push_str("</select></label></form>\n");
}

fn render_create_form(html: &mut String, page: &CategoryPage, txt: &DataBag, url: &str) {
    let form = &page.create_form;
    writeln!(
        html,
        "<form method=\"post\" action=\"{}\" class=\"create_category\"><label>{} <input type=\"text\" name=\"category_name\" maxlength=\"{}\" value=\"{}\"></label>",
        url,
        escape_html(&txt.text("category_name_label")),
        MAX_NAME_LEN,
        escape_html(&form.name)
    )
    .ok();
    if let Some(error) = &form.error {
        writeln!(
            html,
            "<span class=\"field_error\">{}</span>",
            escape_html(error)
        )
        .ok();
    }
    writeln!(
        html,
        "<input type=\"submit\" name=\"create_category\" value=\"{}\"></form>",
        escape_html(&txt.text("create_category_button"))
    )
    .ok();
}

fn render_table(html: &mut String, page: &CategoryPage, txt: &DataBag, url: &str) {
    writeln!(
        html,
        "<form method=\"post\" action=\"{}\" id=\"category_list\"><table class=\"table_grid\"><thead><tr><th><input type=\"checkbox\" class=\"select_all\" onclick=\"{}this.checked)\"></th><th><a href=\"{}?sort={}\">{}</a></th><th>{}</th></tr></thead><tbody>",
        url,
        CHECK_ROWS_JS,
        url,
        page.sort.toggled().as_str(),
        escape_html(&txt.text("column_name")),
        escape_html(&txt.text("column_status"))
    )
    .ok();

    if page.rows.is_empty() {
        writeln!(
            html,
            "<tr class=\"empty\"><td colspan=\"3\">{}</td></tr>",
            escape_html(&txt.text("no_categories"))
        )
        .ok();
    }
    for row in &page.rows {
        let (field, status_key) = if row.active {
            (ACTIVE_IDS_FIELD, "status_active")
        } else {
            (INACTIVE_IDS_FIELD, "status_inactive")
        };
        writeln!(
            html,
            "<tr data-category-id=\"{}\"><td><input type=\"checkbox\" name=\"{}[]\" value=\"{}\"></td><td class=\"category_name\" title=\"{}\">{}</td><td>{}</td></tr>",
            row.id,
            field,
            row.id,
            escape_html(&row.name),
            escape_html(&trim_label(&row.name, NAME_DISPLAY_LEN)),
            escape_html(&txt.text(status_key))
        )
        .ok();
    }

    writeln!(
        html,
        "</tbody></table><div class=\"actions\"><button type=\"submit\" name=\"action\" value=\"category_edit\">{}</button> <button type=\"submit\" name=\"action\" value=\"category_delete\" data-confirm=\"{}\">{}</button> <button type=\"submit\" name=\"activate\" value=\"1\">{}</button> <button type=\"submit\" name=\"deactivate\" value=\"1\">{}</button></div>",
        escape_html(&txt.text("rename_button")),
        escape_html(&txt.text("delete_confirm")),
        escape_html(&txt.text("delete_button")),
        escape_html(&txt.text("activate_button")),
        escape_html(&txt.text("deactivate_button"))
    )
    .ok();
    writeln!(
        html,
        "<div class=\"check_links\"><a href=\"#\" class=\"check_all\" onclick=\"{}true); return false;\">{}</a> - <a href=\"#\" class=\"clear_all\" onclick=\"{}false); return false;\">{}</a></div></form>",
        CHECK_ROWS_JS,
        escape_html(&txt.text("check_all")),
        CHECK_ROWS_JS,
        escape_html(&txt.text("clear_all"))
    )
    .ok();
}

fn render_pager(html: &mut String, page: &CategoryPage, txt: &DataBag, url: &str) {
    let window = &page.window;
    html.push_str("<div class=\"pagination\">");
    if window.has_previous() {
        write!(
            html,
            "<a href=\"{}?page={}\" rel=\"prev\">{}</a> ",
            url,
            window.page - 1,
            escape_html(&txt.text("previous_page"))
        )
        .ok();
    }
    write!(
        html,
        "<span class=\"page_of\">{}</span>",
        escape_html(&sprintf(
            &txt.text("page_of"),
            &[
                window.page.to_string().as_str(),
                window.total_pages.to_string().as_str(),
            ]
        ))
    )
    .ok();
    if window.has_next() {
        write!(
            html,
            " <a href=\"{}?page={}\" rel=\"next\">{}</a>",
            url,
            window.page + 1,
            escape_html(&txt.text("next_page"))
        )
        .ok();
    }
    write!(
        html,
        "<form method=\"get\" action=\"{}\" class=\"page_size\"><label>{} <select name=\"page_size\" onchange=\"this.form.submit()\">",
        url,
        escape_html(&txt.text("page_size_label"))
    )
    .ok();
    for size in PAGE_SIZES {
        write!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            size,
            if size == window.page_size { " selected" } else { "" },
            size
        )
        .ok();
    }
    html.push_str("</select></label></form></div>\n");
}
