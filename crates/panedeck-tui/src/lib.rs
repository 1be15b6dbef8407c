//! panedeck: a terminal dashboard built from string-composited panes and
//! modals.
//!
//! Every frame is a plain `String` (lines joined by `\n`, styling embedded as
//! SGR escapes).  Views render into it, modals are spliced over it by the
//! overlay compositor, and a `HitMap` rebuilt alongside each frame lets the
//! next mouse event find its target.

pub mod action;
pub mod ansi;
pub mod app;
pub mod component;
pub mod components;
pub mod dispatch;
pub mod double_press;
pub mod error;
pub mod focus;
pub mod hitmap;
pub mod interactive;
pub mod layout;
pub mod modal;
pub mod overlay;
pub mod poll;
pub mod provider;
pub mod request;
pub mod scroll;
pub mod text;
pub mod theme;
pub mod tmux;
pub mod widgets;
pub mod workspace;
