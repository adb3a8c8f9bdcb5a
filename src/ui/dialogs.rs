use gtk4 as gtk;
use gtk::prelude::*;

fn message(
    parent: &impl IsA<gtk::Window>,
    kind: gtk::MessageType,
    title: &str,
    detail: &str,
) -> gtk::MessageDialog {
    let dialog = gtk::MessageDialog::new(
        Some(parent),
        gtk::DialogFlags::MODAL | gtk::DialogFlags::DESTROY_WITH_PARENT,
        kind,
        gtk::ButtonsType::Ok,
        title,
    );
    if !detail.is_empty() {
        dialog.set_secondary_text(Some(detail));
    }
    dialog.connect_response(|d, _| d.close());
    dialog.present();
    dialog
}

pub fn info(parent: &impl IsA<gtk::Window>, detail: &str) {
    message(parent, gtk::MessageType::Info, "Information", detail);
}

pub fn error(parent: &impl IsA<gtk::Window>, detail: &str) {
    log::error!("{}", detail);
    message(parent, gtk::MessageType::Error, "Error", detail);
}

pub fn warning(parent: &impl IsA<gtk::Window>, title: &str, detail: &str) {
    message(parent, gtk::MessageType::Warning, title, detail);
}

/// Show a notice and close `parent` once it is dismissed.
pub fn notice_then_close(parent: &impl IsA<gtk::Window>, kind: gtk::MessageType, detail: &str) {
    let title = if kind == gtk::MessageType::Error { "Error" } else { "Information" };
    let dialog = message(parent, kind, title, detail);
    let parent = parent.clone().upcast::<gtk::Window>();
    dialog.connect_response(move |_, _| parent.close());
}

/// Ask a yes/no question; `on_accept` runs only on the accept button.
pub fn confirm(
    parent: &impl IsA<gtk::Window>,
    question: &str,
    detail: Option<&str>,
    accept_label: &str,
    destructive: bool,
    on_accept: impl Fn() + 'static,
) {
    let dialog = gtk::MessageDialog::new(
        Some(parent),
        gtk::DialogFlags::MODAL | gtk::DialogFlags::DESTROY_WITH_PARENT,
        gtk::MessageType::Question,
        gtk::ButtonsType::None,
        question,
    );
    dialog.set_secondary_text(detail);
    dialog.add_button("Cancel", gtk::ResponseType::Cancel);
    let accept = dialog.add_button(accept_label, gtk::ResponseType::Accept);
    if destructive {
        accept.add_css_class("destructive-action");
    } else {
        accept.add_css_class("suggested-action");
    }

    dialog.connect_response(move |d, response| {
        d.close();
        if response == gtk::ResponseType::Accept {
            on_accept();
        }
    });
    dialog.present();
}
