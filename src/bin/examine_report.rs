use calamine::{open_workbook_auto, Data, Reader};
use std::env;

use ibutton_report::report::GROUP_AVERAGE_SHEET;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let file_path = if args.len() > 1 {
        &args[1]
    } else {
        "ibuttons_macro.xlsx"
    };

    println!("Opening report: {file_path}");
    let mut workbook = open_workbook_auto(file_path)?;

    let sheet_names = workbook.sheet_names();
    println!("\nSheet names:");
    for (i, name) in sheet_names.iter().enumerate() {
        println!("  {i}: {name}");
    }

    let sheet_name = match args.get(2) {
        Some(name) => name.clone(),
        None => default_sheet(&sheet_names)
            .ok_or("Workbook has no sheets")?
            .to_string(),
    };

    println!("\n\nExamining sheet: {sheet_name}");
    println!("{}", "=".repeat(100));

    let range = workbook.worksheet_range(&sheet_name)?;
    println!("Dimensions: {:?}", range.get_size());
    println!("\nFirst 30 rows (showing first 10 columns):");
    println!("{}", "=".repeat(100));

    for (row_idx, row) in range.rows().enumerate().take(30) {
        let has_data = row.iter().any(|cell| *cell != Data::Empty);
        if has_data {
            print!("Row {:3}: ", row_idx + 1);
            for cell in row.iter().take(10) {
                if *cell == Data::Empty {
                    print!("[empty] ");
                } else {
                    print!("[{cell}] ");
                }
            }
            println!();
        }
    }

    // Formulas are stored without cached values, so show them separately
    let formulas = workbook.worksheet_formula(&sheet_name)?;
    let (start_row, start_col) = formulas.start().unwrap_or((0, 0));

    println!("\n{}", "=".repeat(100));
    println!("Formulas (first 30 rows):");
    println!("{}", "=".repeat(100));
    for (row_idx, row) in formulas.rows().enumerate().take(30) {
        for (col_idx, formula) in row.iter().enumerate() {
            if !formula.is_empty() {
                let row = start_row as usize + row_idx + 1;
                let col = start_col as usize + col_idx + 1;
                println!("R{row}C{col}: ={formula}");
            }
        }
    }

    Ok(())
}

/// "Group Average" when the report has one, else the first sheet
fn default_sheet(sheet_names: &[String]) -> Option<&str> {
    sheet_names
        .iter()
        .find(|name| *name == GROUP_AVERAGE_SHEET)
        .or_else(|| sheet_names.first())
        .map(String::as_str)
}
