//! HTML rendering for the record listing

use crate::records::Record;

/// Escape text for use in HTML element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <title>Records</title>
  <link rel="stylesheet" href="/style.css">
</head>
<body>
  <h1>Stored records</h1>
  <a href="/" class="back">Back to the form</a>
  <div style="margin-top:18px">
"#;

const PAGE_TAIL: &str = r#"  </div>
</body>
</html>
"#;

/// Render the listing page, one card per record with a remove button
pub fn record_list(records: &[Record]) -> String {
    let mut html = String::from(PAGE_HEAD);

    if records.is_empty() {
        html.push_str("    <p>No records yet.</p>\n");
    }

    for record in records {
        html.push_str(&format!(
            r#"    <div class="card">
      <div><strong>{first} {last}</strong></div>
      <div>Age: {age}</div>
      <form method="POST" action="/remover" style="margin-top:8px">
        <input type="hidden" name="id" value="{id}">
        <button type="submit" class="btn-remove">Remove</button>
      </form>
    </div>
"#,
            first = escape_html(&record.first),
            last = escape_html(&record.last),
            age = record.age,
            id = record.id,
        ));
    }

    html.push_str(PAGE_TAIL);
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordId;

    fn record(id: u64, first: &str, last: &str, age: u32) -> Record {
        Record {
            id: RecordId::new(id),
            first: first.to_string(),
            last: last.to_string(),
            age,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
        assert_eq!(escape_html("Ana"), "Ana");
    }

    #[test]
    fn test_empty_listing() {
        let html = record_list(&[]);
        assert!(html.contains("No records yet."));
        assert!(!html.contains("/remover"));
    }

    #[test]
    fn test_listing_has_remove_form_per_record_in_order() {
        let html = record_list(&[record(1, "Ana", "Lee", 25), record(2, "Bo", "Kim", 31)]);
        assert_eq!(html.matches(r#"action="/remover""#).count(), 2);
        let ana = html.find("Ana Lee").unwrap();
        let bo = html.find("Bo Kim").unwrap();
        assert!(ana < bo);
        assert!(html.contains(r#"name="id" value="1""#));
        assert!(html.contains("Age: 31"));
    }

    #[test]
    fn test_listing_escapes_names() {
        let html = record_list(&[record(1, "<b>Ana</b>", "O'Neil", 25)]);
        assert!(html.contains("&lt;b&gt;Ana&lt;/b&gt; O&#x27;Neil"));
        assert!(!html.contains("<b>Ana</b>"));
    }
}
