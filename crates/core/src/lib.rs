//! Time-synchronized transcript editing: a document model that keeps each
//! word's rendered chars aligned with its audio span while the editable
//! region is changed, plus the session plumbing that fetches and publishes
//! tasks.

pub mod shared {
    pub mod constants;
    pub mod range;
    pub mod rect;
    pub mod text;
}

pub mod transcript {
    pub mod domain {
        pub mod task;
        pub mod word;
    }
}

pub mod editor {
    pub mod domain {
        pub mod content_builder;
        pub mod decoration;
        pub mod document;
        pub mod node;
        pub mod normalizer;
        pub mod selection_bridge;
        pub mod text_layout;
        pub mod timing;
    }
    pub mod infrastructure;
}

pub mod playback {
    pub mod domain {
        pub mod audio_clip;
        pub mod playback_clock;
    }
    pub mod infrastructure;
}

pub mod session {
    pub mod domain {
        pub mod glossary;
        pub mod session_status;
        pub mod state_machine;
        pub mod transport;
    }
    pub mod session_controller;
}

pub mod network {
    pub mod domain {
        pub mod responses;
    }
    pub mod infrastructure;
}
