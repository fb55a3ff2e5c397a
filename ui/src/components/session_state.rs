use dioxus::prelude::*;

use freightdesk_common::session::{
    clear_session, load_session, resolve_screen, save_session, Screen, Session,
};

use super::browser::{self, LocalStorage};

/// Logged-in user, restored from `localStorage` at startup.
pub fn use_session() -> Signal<Option<Session>> {
    use_context::<Signal<Option<Session>>>()
}

/// Requested screen, mirrored into the URL fragment.
pub fn use_screen() -> Signal<Screen> {
    use_context::<Signal<Screen>>()
}

pub fn restore_session() -> Option<Session> {
    load_session(&LocalStorage::default())
}

pub fn initial_screen() -> Screen {
    Screen::from_fragment(&browser::current_fragment())
}

/// Switch screens. The session guard is applied when rendering.
pub fn navigate(mut screen: Signal<Screen>, target: Screen) {
    screen.set(target);
    browser::set_fragment(target.fragment());
}

pub fn log_in(mut session: Signal<Option<Session>>, screen: Signal<Screen>, user: Session) {
    save_session(&mut LocalStorage::default(), &user);
    browser::clog(&format!("[SESSION] Logged in as {}", user.email));
    session.set(Some(user));
    navigate(screen, Screen::Dashboard);
}

pub fn log_out(mut session: Signal<Option<Session>>, screen: Signal<Screen>) {
    clear_session(&mut LocalStorage::default());
    session.set(None);
    navigate(screen, Screen::Landing);
}

/// The screen actually shown for the current request and session.
pub fn visible_screen(screen: Signal<Screen>, session: Signal<Option<Session>>) -> Screen {
    resolve_screen(screen(), session.read().as_ref())
}
