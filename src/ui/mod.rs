//! Val Browser UI layer.
//!
//! Uses `wry` for the content WebView and `tao` for the window and event loop:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The browser chrome is HTML/CSS/JS injected into the page. Notices and the
//! exit prompt are native `rfd` message dialogs.

pub mod webview_app;
