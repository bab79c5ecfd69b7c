/// Performance Example
///
/// This example demonstrates:
/// - Snapshot and enhancement cost on a large table
/// - Timings for search, numeric and date sorts, and paging
/// - Why paging reuses the working set instead of re-querying

use std::time::Instant;
use table_enhancer::{enhance, BodyRow, HeaderCell, Options, Table, TYPE_MARKER};

fn main() {
    println!("=== Table Enhancer Performance Example ===\n");

    let n = 100_000;

    let start = Instant::now();
    let body = (0..n)
        .map(|i| {
            BodyRow::new(vec![
                format!("customer-{:06}", (i * 7919) % n),
                format!("{}.{:02}", (i * 37) % 10_000, i % 100),
                format!("{:04}-{:02}-{:02}", 1995 + i % 30, 1 + i % 12, 1 + i % 28),
            ])
        })
        .collect();
    let handle = Table::new()
        .with_header(vec![
            HeaderCell::new("Customer"),
            HeaderCell::new("Balance").with_attribute(TYPE_MARKER, "number"),
            HeaderCell::new("Opened").with_attribute(TYPE_MARKER, "date"),
        ])
        .with_body(body)
        .into_handle();
    println!("1. Built {} rows in {:?}", n, start.elapsed());

    let start = Instant::now();
    let mut instance = enhance(handle.clone(), &Options::new().with_per_page(50)).remove(0);
    println!("2. Enhanced (snapshot + first render) in {:?}", start.elapsed());

    let start = Instant::now();
    let frame = instance.on_search_changed("customer-0001");
    println!("3. Search matched {} rows in {:?}", frame.window.total_rows, start.elapsed());
    instance.on_search_changed("");

    let start = Instant::now();
    let frame = instance.on_header_clicked(1);
    println!("4. Numeric sort in {:?} ({})", start.elapsed(), frame.info);

    let start = Instant::now();
    let frame = instance.on_header_clicked(2);
    println!("5. Date sort in {:?} ({})", start.elapsed(), frame.info);

    // Paging slices the existing working set; no filter or sort runs.
    let start = Instant::now();
    for page in 1..=1_000 {
        instance.on_page_selected(page);
    }
    println!("6. Selected 1000 pages in {:?}", start.elapsed());

    let start = Instant::now();
    instance.destroy();
    println!("7. Destroyed in {:?}, {} rows visible", start.elapsed(), handle.borrow().visible_row_indices().len());

    println!("\n=== Example Complete ===");
}
