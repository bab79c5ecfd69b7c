/// Basic Enhancer Example
///
/// This example demonstrates:
/// - Building a host table with typed header cells
/// - Searching, sorting and paging through it
/// - Restoring the table with destroy

use table_enhancer::{enhance, BodyRow, HeaderCell, Options, Presenter, RenderFrame, Table, TextPresenter, TYPE_MARKER};

fn show(step: &str, presenter: &mut TextPresenter, frame: &RenderFrame, table: &Table) {
    presenter.render(frame);
    println!("{}", step);
    println!("   {}", presenter.output());
    for &i in &frame.visible_rows {
        println!("   {:>2}: {}", i, table.row_text(i));
    }
    println!();
}

fn main() {
    println!("=== Table Enhancer Basic Example ===\n");

    let people = [
        ("Alice", "34", "2019-04-01"),
        ("bob", "27", "2021-11-15"),
        ("Carol", "41", "2017-08-20"),
        ("Dmitri", "27", "2023-02-06"),
        ("Eve", "38", "unknown"),
        ("Farah", "29", "2020-06-30"),
        ("Gus", "52", "2012-09-12"),
    ];
    let handle = Table::new()
        .with_id("people")
        .with_header(vec![
            HeaderCell::new("Name"),
            HeaderCell::new("Age").with_attribute(TYPE_MARKER, "number"),
            HeaderCell::new("Joined").with_attribute(TYPE_MARKER, "date"),
        ])
        .with_body(
            people
                .iter()
                .map(|(name, age, joined)| BodyRow::new(vec![*name, *age, *joined]))
                .collect(),
        )
        .into_handle();

    let options = Options::new().with_per_page_options(vec![3, 5, 10]);
    let mut instance = enhance(handle.clone(), &options).remove(0);
    let mut presenter = TextPresenter::new();
    presenter.mount(&instance.controls());

    let frame = instance.refresh();
    show("1. Initial page", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_header_clicked(1);
    show("2. Sorted by age (ascending, ties keep their order)", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_header_clicked(1);
    show("3. Sorted by age (descending)", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_page_selected(3);
    show("4. Last page", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_header_clicked(2);
    show("5. Sorted by join date (unparseable dates first)", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_search_changed("  A  ");
    show("6. Search for 'a'", &mut presenter, &frame, &handle.borrow());

    let frame = instance.on_search_changed("nobody");
    show("7. Search with no matches", &mut presenter, &frame, &handle.borrow());

    instance.destroy();
    println!("8. Destroyed: visible rows {:?}", handle.borrow().visible_row_indices());

    println!("\n=== Example Complete ===");
}
