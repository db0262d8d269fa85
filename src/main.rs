use reporting_categories::manage_categories::CategoryController;
use reporting_categories::services::{AdminContext, InMemoryService};
use reporting_categories::templates::categories_template::render_category_page;
use reporting_categories::view_state::InMemoryViewStateStore;

fn main() {
    let service = InMemoryService::new_with_sample();
    let controller = CategoryController::new(service, InMemoryViewStateStore::default());

    let mut ctx = AdminContext::for_account(1);
    ctx.post_vars.set("create_category", "Create Category");
    ctx.post_vars.set("category_name", "Weekend Promotions");
    if let Err(error) = controller.handle(&mut ctx) {
        eprintln!("create -> {error}");
    }

    let mut ctx = AdminContext::for_account(1);
    ctx.request.set("show", "All");
    match controller.handle(&mut ctx) {
        Ok(page) => println!("{}", render_category_page(&page, &ctx.txt, &ctx.scripturl)),
        Err(error) => eprintln!("list -> {error}"),
    }
}
