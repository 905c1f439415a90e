// Incremental scroll of the results list (LinkedIn lazy-loads cards while scrolling)

/// Scroll distance ceiling
pub const SCROLL_END: u32 = 3600;
const INITIAL_STEP: u32 = 300;
const STEP_DECREMENT: u32 = 10;
const MIN_STEP: u32 = 10;

/// Intermediate scroll offsets for a container of `scroll_height` pixels
///
/// Starts at 0 with a 300px step that shrinks by 10px per step (never below 10px) and
/// stops before `min(3600, scroll_height)`. The caller finishes with a scroll to `end`.
pub fn scroll_positions(scroll_height: u32) -> Vec<u32> {
    let end = scroll_end(scroll_height);
    let mut positions = Vec::new();
    let mut position = 0;
    let mut step = INITIAL_STEP;

    while position < end {
        positions.push(position);
        position += step;
        step = step.saturating_sub(STEP_DECREMENT).max(MIN_STEP);
    }
    positions
}

pub fn scroll_end(scroll_height: u32) -> u32 {
    scroll_height.min(SCROLL_END)
}

/// Script measuring the results container: its scrollHeight, or -1 when it is missing,
/// hidden or not scrollable
pub(crate) const MEASURE_SCRIPT: &str = r#"
(() => {
    const footer = document.querySelector('#jobs-search-results-footer');
    const list = footer ? footer.parentElement : null;
    if (!list) return -1;
    const style = window.getComputedStyle(list);
    if (style.display === 'none' || style.visibility === 'hidden') return -1;
    if (list.scrollHeight <= list.clientHeight) return -1;
    return list.scrollHeight;
})()
"#;

pub(crate) fn scroll_to_script(position: u32) -> String {
    format!(
        "(() => {{ const footer = document.querySelector('#jobs-search-results-footer'); \
         if (footer && footer.parentElement) {{ footer.parentElement.scrollTop = {}; }} }})()",
        position
    )
}
