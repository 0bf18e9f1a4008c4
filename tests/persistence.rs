use approx::assert_relative_eq;
use stereopair::{
    CanvasPos, Edge, FractionalImagePos, ImagePixelCoordinate, ImageSize, Project,
};

fn populated_project() -> Project {
    let mut project = Project::new();
    project.set_image_sizes(ImageSize::new(1600, 1200), ImageSize::new(1610, 1190));
    {
        let mut left = project.left.borrow_mut();
        left.transform.center = FractionalImagePos::new(0.0625, -0.125);
        left.transform.rotation = 0.0125;
        left.markers.add(ImagePixelCoordinate::new(100.0, 200.0));
        left.markers.add(ImagePixelCoordinate::new(800.0, 650.5));
    }
    {
        let mut right = project.right.borrow_mut();
        right.transform.center = FractionalImagePos::new(-0.03125, 0.25);
        right.transform.rotation = -0.0125;
        right.markers.add(ImagePixelCoordinate::new(120.0, 210.0));
        right.markers.add(ImagePixelCoordinate::new(815.0, 655.0));
    }
    project.clip_box.set_size((1400, 900));
    project
}

#[test]
fn json_round_trip_restores_the_document() {
    let mut original = populated_project();
    let text = original.to_json().unwrap();

    let mut restored = Project::new();
    restored.from_json(&text).unwrap();

    {
        let want = original.left.borrow();
        let got = restored.left.borrow();
        assert_eq!(got.size(), want.size());
        assert_eq!(got.markers, want.markers);
        assert_relative_eq!(
            got.transform.center.x(),
            want.transform.center.x(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            got.transform.center.y(),
            want.transform.center.y(),
            epsilon = 1e-12
        );
        assert_relative_eq!(got.transform.rotation, want.transform.rotation);
    }

    assert_eq!(restored.right.borrow().markers, original.right.borrow().markers);
    assert_eq!(restored.clip_box.size(), original.clip_box.size());
}

#[test]
fn serialization_normalizes_the_clip_box() {
    let mut project = populated_project();
    project
        .clip_box
        .adjust(Edge::RIGHT, CanvasPos::new(0.3, 0.0));
    assert!(project.clip_box.left() != -project.clip_box.right());

    project.to_data();

    // Stored geometry is canonical: the box sits centered on the origin.
    assert_relative_eq!(project.clip_box.left(), -project.clip_box.right());
    assert_relative_eq!(project.clip_box.top(), -project.clip_box.bottom());
}

#[test]
fn saved_projects_identify_the_app() {
    let mut project = populated_project();
    let data = project.to_data();
    assert_eq!(data.app.name, "stereopair");
    assert!(!data.app.version.is_empty());
}
