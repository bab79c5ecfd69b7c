/// Multiple Tables Example
///
/// This example demonstrates:
/// - Loading tables from CSV and JSON into a document
/// - Enhancing every table matching a selector with shared options
/// - Instances keeping independent state

use table_enhancer::{enhance, Document, Options, Table, Target};

const CITIES: &str = "City,Country,Population\n\
Oslo,Norway,709037\n\
Bergen,Norway,291940\n\
Lisbon,Portugal,545796\n\
Porto,Portugal,231800\n\
Ghent,Belgium,265086\n";

const RELEASES: &str = r#"{
    "id": "releases",
    "classes": ["enhance"],
    "columns": [{"text": "Version"}, {"text": "Released", "type": "date"}],
    "rows": [["1.2.0", "March 3, 2024"], ["1.0.0", "2023-06-01"], ["1.1.0", "Nov 20, 2023"], ["0.9.0", "?"]]
}"#;

fn main() -> Result<(), table_enhancer::TableError> {
    println!("=== Table Enhancer Multiple Tables Example ===\n");

    let mut doc = Document::new();
    let cities = doc.add_table(Table::from_csv("cities", CITIES)?.with_class("enhance"));
    let releases = doc.add_table(Table::from_json(RELEASES)?);
    doc.add_table(Table::new().with_id("layout").with_class("enhance"));
    println!("Document holds {} tables", doc.len());

    let options = Options::from_json(r#"{"perPageOptions": [2, 4], "numericCols": [2]}"#)?;
    let mut instances = enhance(Target::Selector(&doc, "table.enhance"), &options);
    println!("Enhanced {} of them (the layout table has no header)\n", instances.len());

    let frame = instances[0].on_header_clicked(2);
    println!("cities by population: {}", frame.info);
    for &i in &frame.visible_rows {
        println!("   {}", cities.borrow().row_text(i));
    }

    let frame = instances[1].on_header_clicked(1);
    println!("releases by date: {}", frame.info);
    for &i in &frame.visible_rows {
        println!("   {}", releases.borrow().row_text(i));
    }

    let frame = instances[0].on_search_changed("portugal");
    println!("\ncities matching 'portugal': {:?}", frame.visible_rows);
    println!("releases untouched: {:?}", instances[1].state());

    for instance in instances {
        instance.destroy();
    }
    println!("\nAfter destroy:");
    println!("   cities visible:   {:?}", cities.borrow().visible_row_indices());
    println!("   releases visible: {:?}", releases.borrow().visible_row_indices());

    println!("\n=== Example Complete ===");
    Ok(())
}
