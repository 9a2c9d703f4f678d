//! Printable export of the preview. The invoice is rendered into a standalone
//! HTML page that any browser can print; the page carries its own print
//! stylesheet so the printout ignores the on-screen colors.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};
use tracing::info;

use crate::error::ExportError;
use crate::invoice::InvoiceSnapshot;

const INVOICE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Invoice {{ number }}</title>
    <style>
      body { font-family: sans-serif; margin: 2rem; display: flex; justify-content: center; }
      .invoice-preview { width: 100%; max-width: 48rem; padding: 2rem; border: 1px solid #ccc;
        background: {{ background }}; color: {{ text }}; }
      .invoice-header { display: flex; justify-content: space-between; align-items: flex-start; }
      .logo { max-height: 5rem; max-width: 12rem; }
      table { width: 100%; border-collapse: collapse; margin-top: 1.5rem; }
      th, td { padding: 0.4rem; border-bottom: 1px solid #ddd; text-align: left; }
      td.num, th.num { text-align: right; }
      .total { text-align: right; margin-top: 1rem; font-size: 1.2rem; }
      @media print {
        body {
          background: white !important;
          color: black !important;
          -webkit-print-color-adjust: exact;
          print-color-adjust: exact;
          margin: 0;
          padding: 0;
        }
        .invoice-preview {
          background: white !important;
          color: black !important;
          box-shadow: none !important;
          border: none !important;
        }
        .no-print { display: none !important; }
      }
    </style>
  </head>
  <body>
    <div id="invoicePreview" class="invoice-preview">
      <div class="invoice-header">
        <div>
          {% if logo %}<img class="logo" src="{{ logo | safe }}" alt="Company logo">{% endif %}
          <h1>{{ details.company_name }}</h1>
          <div>{{ details.company_address }}</div>
          <div>{{ details.company_phone }}</div>
        </div>
        <div>
          <h2>Invoice</h2>
          <div><strong>Invoice #:</strong> {{ number }}</div>
          <div><strong>Date:</strong> {{ date }}</div>
        </div>
      </div>
      <div><strong>Bill to:</strong> {{ details.buyer_name }}</div>
      <table>
        <thead>
          <tr><th>Description</th><th class="num">Qty</th><th class="num">Unit price</th><th class="num">Amount</th></tr>
        </thead>
        <tbody>
          {% for row in rows %}
          <tr><td>{{ row.description }}</td><td class="num">{{ row.quantity }}</td><td class="num">{{ row.unit_price }}</td><td class="num">{{ row.amount }}</td></tr>
          {% endfor %}
        </tbody>
      </table>
      <div class="total"><strong>Total: {{ total }}</strong></div>
      <p class="no-print">Use your browser's print command to print or save as PDF.</p>
    </div>
  </body>
</html>
"#;

#[derive(Serialize)]
struct ExportRow {
    description: String,
    quantity: u32,
    unit_price: String,
    amount: String,
}

/// Render the snapshot as a complete HTML document. User text is escaped.
pub fn render_html(snapshot: &InvoiceSnapshot) -> Result<String, ExportError> {
    let rows: Vec<ExportRow> = snapshot
        .printable_items()
        .into_iter()
        .map(|item| ExportRow {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: snapshot.money(item.unit_price),
            amount: snapshot.money(item.amount()),
        })
        .collect();

    let mut context = Context::new();
    context.insert("number", &snapshot.number.to_string());
    context.insert("date", &snapshot.number.date.to_string());
    context.insert("details", &snapshot.details);
    context.insert("rows", &rows);
    context.insert("total", &snapshot.total_display());
    context.insert("background", &snapshot.preferences.background.to_string());
    context.insert("text", &snapshot.preferences.text.to_string());
    context.insert(
        "logo",
        &snapshot.logo.as_ref().map(|logo| logo.data_url.as_str()),
    );

    Ok(Tera::one_off(INVOICE_TEMPLATE, &context, true)?)
}

/// File name the export of `snapshot` is written to.
pub fn export_file_name(snapshot: &InvoiceSnapshot) -> String {
    format!("invoice-{}.html", snapshot.number)
}

/// Write the rendered invoice into `dir` (created when missing) and return
/// the file path. Re-exporting the same number overwrites the earlier file.
pub fn export_snapshot(snapshot: &InvoiceSnapshot, dir: &Path) -> Result<PathBuf, ExportError> {
    let html = render_html(snapshot)?;
    let path = dir.join(export_file_name(snapshot));
    let write_err = |source| ExportError::Write {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(write_err)?;
    fs::write(&path, html).map_err(write_err)?;
    info!(path = %path.display(), number = %snapshot.number, "exported invoice");
    Ok(path)
}

/// Hand the exported file to the system viewer so it can be printed.
pub fn open_export(path: &Path) -> Result<(), ExportError> {
    open::that(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })
}
