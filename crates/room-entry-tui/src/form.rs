// room entry form: validation + controller

use tracing::{debug, info, warn};

use crate::nav::{room_path, Navigator};
use crate::store::KvStore;

/// Key the player's name is remembered under.
pub const NAME_KEY: &str = "name";

pub const ROOM_ID_REQUIRED: &str = "Room ID is required";
pub const NAME_REQUIRED: &str = "Name is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RoomId,
    Name,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::RoomId, Field::Name];

    pub fn key(self) -> &'static str {
        match self {
            Field::RoomId => "roomId",
            Field::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub room_id: String,
    pub name: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::RoomId => &self.room_id,
            Field::Name => &self.name,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::RoomId => &mut self.room_id,
            Field::Name => &mut self.name,
        }
    }
}

/// Per-field messages; a field has an entry only while it is invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    room_id: Option<&'static str>,
    name: Option<&'static str>,
}

impl FormErrors {
    pub fn get(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::RoomId => self.room_id,
            Field::Name => self.name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.room_id.is_none() && self.name.is_none()
    }
}

/// Both fields must be non-empty. No trimming: "  " is a valid name.
pub fn validate(values: &FormValues) -> FormErrors {
    FormErrors {
        room_id: values.room_id.is_empty().then_some(ROOM_ID_REQUIRED),
        name: values.name.is_empty().then_some(NAME_REQUIRED),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub values: FormValues,
    pub errors: FormErrors,
    /// Latches on the first submit attempt.
    pub show_errors: bool,
    pub are_errors: bool,
}

impl FormState {
    /// Error text the screen should display for `field`, if any.
    pub fn visible_error(&self, field: Field) -> Option<&'static str> {
        if self.show_errors {
            self.errors.get(field)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    Blocked,
    Joined(String),
}

/// Owns the form state and the two side-effect seams.
pub struct FormController<S, N> {
    state: FormState,
    store: S,
    nav: N,
}

impl<S: KvStore, N: Navigator> FormController<S, N> {
    /// Builds the form, prefilling the name remembered from a previous join.
    pub fn mount(store: S, nav: N) -> Self {
        let mut values = FormValues::default();
        match store.get(NAME_KEY) {
            Ok(Some(name)) if !name.is_empty() => {
                info!(len = name.len(), "restored saved name");
                values.name = name;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not read saved name"),
        }
        let mut me = Self {
            state: FormState {
                values,
                ..FormState::default()
            },
            store,
            nav,
        };
        me.revalidate();
        me
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn set_field(&mut self, field: Field, value: String) {
        debug!(field = field.key(), len = value.len(), "field changed");
        *self.state.values.slot_mut(field) = value;
        self.revalidate();
    }

    fn revalidate(&mut self) {
        self.state.errors = validate(&self.state.values);
        self.state.are_errors = !self.state.errors.is_empty();
    }

    pub fn submit(&mut self) -> Submit {
        self.state.show_errors = true;
        if self.state.are_errors {
            debug!(
                room_id = ?self.state.errors.get(Field::RoomId),
                name = ?self.state.errors.get(Field::Name),
                "submit blocked"
            );
            return Submit::Blocked;
        }
        let name = &self.state.values.name;
        if let Err(e) = self.store.set(NAME_KEY, name) {
            warn!(error = %e, "could not save name");
        }
        let path = room_path(&self.state.values.room_id);
        info!(path = %path, "joining room");
        self.nav.navigate(&path);
        Submit::Joined(path)
    }

    pub fn into_parts(self) -> (FormState, S, N) {
        (self.state, self.store, self.nav)
    }
}
