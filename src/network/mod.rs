mod events;
mod resources;
mod systems;
mod transport;

use std::sync::{Arc, Mutex};

use bevy::prelude::*;

pub use events::*;
pub use resources::*;
pub use systems::*;
pub use transport::*;

/// Wires `transport` into the app: requests go out through [`MoveClient`],
/// replies are turned into [`NetworkEvent<ServerReply>`] every `PreUpdate`.
pub fn setup_transport(app: &mut App, transport: Arc<dyn Transport>) {
    let (tx, rx) = crossbeam_channel::unbounded::<ServerReply>();
    app.insert_resource(MoveClient::new(transport, tx));
    app.insert_resource(EventQueue::<ServerReply>(Mutex::new(rx)));
    app.add_event::<NetworkEvent<ServerReply>>();
    app.add_systems(PreUpdate, process_network_queue::<ServerReply>);
}

/// Listens on the EventQueue and writes Bevy events
fn process_network_queue<T: 'static + Send + Sync>(
    maybe_queue: Option<Res<EventQueue<T>>>,
    mut writer: EventWriter<NetworkEvent<T>>,
) {
    let Some(q) = maybe_queue else {
        return;
    };
    let Ok(queue) = q.lock() else {
        error!("Network queue lock poisoned");
        return;
    };
    if !queue.is_empty() {
        writer.write_batch(queue.try_iter().map(NetworkEvent));
    }
}
