pub mod ask;
pub mod cache;
pub mod dataset;
pub mod doctor;
pub mod route;

/// First `max` characters of `text`, with `...` when cut.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
