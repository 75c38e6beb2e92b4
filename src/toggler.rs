use super::*;
use std::rc::Rc;

// Dataset entry pairing a toggler with its content: `data-toggler`.
pub(crate) const TOGGLER_DATA_KEY: &str = "toggler";

/// Switches for [`Selection::add_toggler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TogglerOptions {
    /// Hide every content element as soon as the toggler is wired up.
    pub close_on_load: bool,
    /// On every toggler click, force content with a different identifier
    /// hidden.
    pub close_others: bool,
}

impl Selection {
    /// Wires accordion-style show/hide groups: this selection is the set of
    /// toggler elements, `content_selector` names the content elements, and
    /// the `data-toggler` entry on both sides pairs them. Clicking a toggler
    /// flips the visibility of every content element sharing its identifier
    /// and invokes the callback once per flipped element; with
    /// [`TogglerOptions::close_others`] all other content is forced hidden.
    /// Content missing the identifier never pairs. Visibility in the
    /// document is the only state.
    pub fn add_toggler(
        &self,
        content_selector: &str,
        options: TogglerOptions,
        callback: impl Fn(&Selection) + 'static,
    ) -> Result<&Self> {
        let callback: Rc<dyn Fn(&Selection)> = Rc::new(callback);

        let contents = self.page.select(content_selector)?;
        if options.close_on_load {
            contents.each(|content| {
                content.hide();
            })?;
        }

        let weak = self.page.downgrade();
        let content_selector = content_selector.to_string();
        self.each(|toggler| {
            let weak = weak.clone();
            let content_selector = content_selector.clone();
            let callback = Rc::clone(&callback);
            let toggler_selector = toggler.selector().to_string();
            toggler.when("click", move |_event| {
                let Some(page) = weak.upgrade() else {
                    return;
                };
                let _ = run_toggle_pass(
                    &page,
                    &toggler_selector,
                    &content_selector,
                    options,
                    &callback,
                );
            });
        })?;
        Ok(self)
    }
}

fn run_toggle_pass(
    page: &Page,
    toggler_selector: &str,
    content_selector: &str,
    options: TogglerOptions,
    callback: &Rc<dyn Fn(&Selection)>,
) -> Result<()> {
    let ident = page.select(toggler_selector)?.data(TOGGLER_DATA_KEY)?;
    page.select(content_selector)?.each(|content| {
        let content_ident = content.data(TOGGLER_DATA_KEY).ok().flatten();
        match (&ident, content_ident) {
            (Some(wanted), Some(found)) if *wanted == found => {
                let _ = content.toggle();
                callback(&content);
            }
            _ => {
                if options.close_others {
                    content.hide();
                }
            }
        }
    })?;
    Ok(())
}
