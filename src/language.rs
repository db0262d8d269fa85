use crate::services::AdminContext;

pub fn apply_language(ctx: &mut AdminContext, lang: &str) {
    let pack = ActiveLanguage::detect(ctx);
    if lang == "ManageCategories" {
        load_manage_categories(ctx, pack);
    }
}

/// Fills `%1$s`, `%2$s`, ... placeholders.
pub fn sprintf(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        out = out.replace(&format!("%{}$s", index + 1), arg);
    }
    out
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ActiveLanguage {
    English,
    ChineseSimplified,
}

impl ActiveLanguage {
    fn detect(ctx: &AdminContext) -> Self {
        Self::from_code(ctx.account.language.as_str())
    }

    fn from_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_lowercase();
        if normalized.starts_with("zh") || normalized.contains("chinese") {
            Self::ChineseSimplified
        } else {
            Self::English
        }
    }

    fn pick<'a>(&self, english: &'a str, chinese: &'a str) -> &'a str {
        match self {
            ActiveLanguage::English => english,
            ActiveLanguage::ChineseSimplified => chinese,
        }
    }
}

fn load_manage_categories(ctx: &mut AdminContext, lang: ActiveLanguage) {
    let strings = [
        ("category_title", "Site Reporting Categories", "网站报告类别"),
        ("category_name_label", "Category name", "类别名称"),
        ("create_category_button", "Create Category", "创建类别"),
        ("category_name_required", "Please enter a category name.", "请输入类别名称。"),
        (
            "category_name_too_long",
            "Category names can be at most %1$s characters long.",
            "类别名称最多 %1$s 个字符。",
        ),
        (
            "select_category_to_rename",
            "Please select a category to rename.",
            "请选择要重命名的类别。",
        ),
        (
            "select_only_one_to_rename",
            "Please select only one category to rename.",
            "重命名时只能选择一个类别。",
        ),
        (
            "select_category_to_delete",
            "Please select at least one category to delete.",
            "请至少选择一个要删除的类别。",
        ),
        (
            "select_inactive_to_activate",
            "Please select at least one inactive category to activate.",
            "请至少选择一个未启用的类别进行启用。",
        ),
        (
            "select_active_to_deactivate",
            "Please select at least one active category to deactivate.",
            "请至少选择一个已启用的类别进行停用。",
        ),
        (
            "error_single_category",
            "There was an error %1$s the category: %2$s",
            "%1$s类别时出错：%2$s",
        ),
        (
            "error_selected_categories",
            "There was an error %1$s the selected categories: %2$s",
            "%1$s所选类别时出错：%2$s",
        ),
        ("verb_creating", "creating", "创建"),
        ("verb_deleting", "deleting", "删除"),
        ("verb_activating", "activating", "启用"),
        ("verb_deactivating", "deactivating", "停用"),
        ("reason_invalid_name", "the name is not valid.", "名称无效。"),
        (
            "reason_duplicate_name",
            "a category with that name already exists.",
            "已存在同名类别。",
        ),
        (
            "reason_not_found",
            "one or more categories no longer exist.",
            "一个或多个类别已不存在。",
        ),
        (
            "reason_active_limit",
            "no more than %1$s categories can be active at once.",
            "同时启用的类别不能超过 %1$s 个。",
        ),
        (
            "reason_unavailable",
            "the service is temporarily unavailable. Please try again later.",
            "服务暂时不可用，请稍后再试。",
        ),
        (
            "error_loading_categories",
            "There was an error loading your categories.",
            "加载类别时出错。",
        ),
        ("show_label", "Show", "显示"),
        ("show_Active", "Active", "已启用"),
        ("show_Inactive", "Inactive", "未启用"),
        ("show_All", "All", "全部"),
        ("column_name", "Category", "类别"),
        ("column_status", "Status", "状态"),
        ("status_active", "Active", "已启用"),
        ("status_inactive", "Inactive", "未启用"),
        ("rename_button", "Rename", "重命名"),
        ("delete_button", "Delete", "删除"),
        ("activate_button", "Activate", "启用"),
        ("deactivate_button", "Deactivate", "停用"),
        ("check_all", "Check All", "全选"),
        ("clear_all", "Clear All", "全部清除"),
        ("rename_popup_title", "Rename Category", "重命名类别"),
        ("rename_save", "Save", "保存"),
        ("cancel", "Cancel", "取消"),
        (
            "delete_confirm",
            "Delete the selected categories? Reports will no longer be grouped by them.",
            "确定删除所选类别吗？报告将不再按这些类别分组。",
        ),
        (
            "active_limit_note",
            "Note: at most %1$s categories can be active at one time (%2$s active now).",
            "注意：同时最多可启用 %1$s 个类别（当前已启用 %2$s 个）。",
        ),
        ("no_categories", "There are no categories to show.", "没有可显示的类别。"),
        ("page_of", "Page %1$s of %2$s", "第 %1$s 页，共 %2$s 页"),
        ("previous_page", "Previous", "上一页"),
        ("next_page", "Next", "下一页"),
        ("page_size_label", "Per page", "每页"),
    ];
    for (key, english, chinese) in strings {
        ctx.txt.set(key, lang.pick(english, chinese));
    }
}
