//! Example demonstrating the namespace service
//!
//! Registers the s2fs type, mounts a namespace, walks to /foo/bar, and
//! reads its content.

use services_namespace::{
    FilesystemType, MountOptions, MountService, NamespaceOperations,
};

fn main() {
    println!("=== s2fs Namespace Demo ===\n");

    let mut service = MountService::new();
    service
        .register_type(FilesystemType::s2fs())
        .expect("Failed to register s2fs");
    println!("1. Registered filesystem type \"s2fs\"");

    let ns = service
        .mount("s2fs", &MountOptions::default())
        .expect("Failed to mount");
    println!("2. Mounted namespace {}", ns.id());

    let root = service
        .with_namespace(ns, |n| n.root())
        .expect("Namespace vanished");
    println!("3. Listing / ...");
    for binding in service.list(ns, root).expect("Failed to list root") {
        println!("   - {} -> {}", binding.name, binding.child);
    }

    let bar = service.resolve(ns, "foo/bar").expect("Failed to resolve");
    let stat = service.stat(ns, bar).expect("Failed to stat");
    println!("4. /foo/bar: kind={} mode={} size={:?}", stat.kind, stat.mode, stat.size);

    let handle = service.open(ns, bar).expect("Failed to open");
    let bytes = service.read(ns, handle, 0, 64).expect("Failed to read");
    println!("5. Content: {:?}", String::from_utf8_lossy(&bytes));

    service.unmount(ns).expect("Failed to unmount");
    println!("6. Unmounted\n");

    println!("=== Demo Complete ===");
}
