//! A selectable control that toggles two entity sets and writes a speed
//! scalar into target renderers' override blocks.

use bevy_ecs::event::Events;
use bevy_ecs::prelude::*;
use pelt_config::UiConfig;
use pelt_ecs::{Active, MeshRenderer};
use tracing::debug;

/// Shader property the speed is written to unless configured otherwise.
pub const DEFAULT_SPEED_PROPERTY: &str = "_Speed";

/// The UI selection system: which control currently has focus.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiSelection {
    /// Control holding focus, if any.
    pub current: Option<Entity>,
}

/// Emitted by [`SelectionSpeedControl`].
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// The control was selected.
    Selected(Entity),
    /// The control was deselected.
    Deselected(Entity),
    /// A toggle bound to the control was switched on.
    AdditionalAction(Entity),
}

/// Make the world ready to receive [`SelectionEvent`]s.
pub fn register_ui_events(world: &mut World) {
    world.init_resource::<Events<SelectionEvent>>();
}

/// Selection-driven visibility and speed control.
///
/// `control` identifies the control in emitted events and is compared
/// against [`UiSelection::current`].
#[derive(Component, Debug, Clone)]
pub struct SelectionSpeedControl {
    /// Entity standing for this control.
    pub control: Entity,
    /// Activated on select, deactivated on deselect.
    pub select_set: Vec<Entity>,
    /// Deactivated on select, activated on deselect.
    pub deselect_set: Vec<Entity>,
    /// Renderers receiving the speed.
    pub targets: Vec<Entity>,
    /// Float property the speed is written to.
    pub speed_property: String,
    /// Speed written on select.
    pub speed_on_select: f32,
    /// Speed written on deselect.
    pub speed_on_deselect: f32,
    /// Speed written when a bound toggle turns on.
    pub toggle_on_speed: f32,
    /// Speed written when a bound toggle turns off.
    pub toggle_off_speed: f32,
    current_speed: f32,
    selected: bool,
}

impl SelectionSpeedControl {
    /// Deselected control with default speeds and no targets.
    pub fn new(control: Entity) -> Self {
        Self {
            control,
            select_set: Vec::new(),
            deselect_set: Vec::new(),
            targets: Vec::new(),
            speed_property: DEFAULT_SPEED_PROPERTY.to_string(),
            speed_on_select: 2.0,
            speed_on_deselect: 0.0,
            toggle_on_speed: 2.0,
            toggle_off_speed: 0.0,
            current_speed: 0.0,
            selected: false,
        }
    }

    /// Control with property name and speeds from the `ui` config section.
    pub fn from_config(control: Entity, config: &UiConfig) -> Self {
        Self {
            speed_property: config.speed_property_name.clone(),
            speed_on_select: config.speed_on_select,
            speed_on_deselect: config.speed_on_deselect,
            toggle_on_speed: config.toggle_on_speed,
            toggle_off_speed: config.toggle_off_speed,
            ..Self::new(control)
        }
    }

    /// Returns `true` between [`select`](Self::select) and
    /// [`deselect`](Self::deselect).
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Last speed written.
    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    /// Initial state: deselected.
    pub fn on_awake(&mut self, world: &mut World) {
        self.deselect(world);
    }

    /// Sync with the selection system: select if this control has focus,
    /// otherwise deselect. Does nothing without a [`UiSelection`] resource.
    pub fn on_enable(&mut self, world: &mut World) {
        let Some(selection) = world.get_resource::<UiSelection>().copied() else {
            return;
        };
        if selection.current == Some(self.control) {
            self.select(world);
        } else {
            self.deselect(world);
        }
    }

    /// Re-apply the cached speed, e.g. after the property name changed.
    pub fn on_validate(&mut self, world: &mut World) {
        self.apply_speed(world);
    }

    /// Show the select set, hide the deselect set and write the select speed.
    pub fn select(&mut self, world: &mut World) {
        self.selected = true;
        set_active(world, &self.select_set, true);
        set_active(world, &self.deselect_set, false);
        world.send_event(SelectionEvent::Selected(self.control));
        self.set_speed(world, self.speed_on_select);
    }

    /// Hide the select set, show the deselect set and write the deselect speed.
    pub fn deselect(&mut self, world: &mut World) {
        self.selected = false;
        set_active(world, &self.select_set, false);
        set_active(world, &self.deselect_set, true);
        world.send_event(SelectionEvent::Deselected(self.control));
        self.set_speed(world, self.speed_on_deselect);
    }

    /// Cache `value` and write it to every target renderer.
    pub fn set_speed(&mut self, world: &mut World, value: f32) {
        self.current_speed = value;
        self.apply_speed(world);
    }

    /// Slider hook; `None` (no slider) is ignored.
    pub fn set_speed_from_slider(&mut self, world: &mut World, slider: Option<f32>) {
        if let Some(value) = slider {
            self.set_speed(world, value);
        }
    }

    /// Toggle hook: on/off speed by toggle state; `None` is ignored.
    pub fn apply_toggle_speed(&mut self, world: &mut World, toggle: Option<bool>) {
        if let Some(is_on) = toggle {
            let speed = if is_on {
                self.toggle_on_speed
            } else {
                self.toggle_off_speed
            };
            self.set_speed(world, speed);
        }
    }

    /// Add `delta` to the current speed.
    pub fn nudge_speed(&mut self, world: &mut World, delta: f32) {
        self.set_speed(world, self.current_speed + delta);
    }

    /// Emit [`SelectionEvent::AdditionalAction`] when the toggle is on.
    pub fn on_toggle(&self, world: &mut World, is_on: bool) {
        if is_on {
            world.send_event(SelectionEvent::AdditionalAction(self.control));
        }
    }

    fn apply_speed(&self, world: &mut World) {
        for &target in &self.targets {
            let Some(mut renderer) = world.get_mut::<MeshRenderer>(target) else {
                continue;
            };
            let mut block = renderer.property_block();
            block.set_float(&self.speed_property, self.current_speed);
            renderer.set_property_block(block);
        }
        debug!(control = ?self.control, speed = self.current_speed, property = %self.speed_property, "speed applied");
    }
}

fn set_active(world: &mut World, set: &[Entity], state: bool) {
    for &entity in set {
        if let Ok(mut entity) = world.get_entity_mut(entity) {
            entity.insert(Active(state));
        }
    }
}

#[cfg(test)]
mod tests {
    use pelt_ecs::create_world;

    use super::*;

    struct Fixture {
        world: World,
        control: SelectionSpeedControl,
        shown: Entity,
        hidden: Entity,
        target: Entity,
    }

    fn fixture() -> Fixture {
        let mut world = create_world();
        register_ui_events(&mut world);
        let owner = world.spawn_empty().id();
        let shown = world.spawn(Active(false)).id();
        let hidden = world.spawn(Active(true)).id();
        let target = world.spawn(MeshRenderer::default()).id();

        let mut control = SelectionSpeedControl::new(owner);
        control.select_set.push(shown);
        control.deselect_set.push(hidden);
        control.targets.push(target);
        Fixture {
            world,
            control,
            shown,
            hidden,
            target,
        }
    }

    fn speed(world: &World, target: Entity) -> Option<f32> {
        world
            .get::<MeshRenderer>(target)?
            .property_block()
            .get_float(DEFAULT_SPEED_PROPERTY)
    }

    fn drain(world: &mut World) -> Vec<SelectionEvent> {
        world
            .resource_mut::<Events<SelectionEvent>>()
            .drain()
            .collect()
    }

    #[test]
    fn test_select_toggles_sets_and_writes_speed() {
        let mut f = fixture();
        f.control.select(&mut f.world);

        assert!(f.control.is_selected());
        assert_eq!(f.world.get::<Active>(f.shown), Some(&Active(true)));
        assert_eq!(f.world.get::<Active>(f.hidden), Some(&Active(false)));
        assert_eq!(speed(&f.world, f.target), Some(2.0));
        assert_eq!(
            drain(&mut f.world),
            vec![SelectionEvent::Selected(f.control.control)]
        );
    }

    #[test]
    fn test_deselect_is_inverse() {
        let mut f = fixture();
        f.control.select(&mut f.world);
        f.control.deselect(&mut f.world);

        assert!(!f.control.is_selected());
        assert_eq!(f.world.get::<Active>(f.shown), Some(&Active(false)));
        assert_eq!(f.world.get::<Active>(f.hidden), Some(&Active(true)));
        assert_eq!(speed(&f.world, f.target), Some(0.0));
        assert_eq!(
            drain(&mut f.world).last(),
            Some(&SelectionEvent::Deselected(f.control.control))
        );
    }

    #[test]
    fn test_on_enable_follows_selection_system() {
        let mut f = fixture();
        f.control.on_enable(&mut f.world);
        assert!(drain(&mut f.world).is_empty());

        f.world.insert_resource(UiSelection {
            current: Some(f.control.control),
        });
        f.control.on_enable(&mut f.world);
        assert!(f.control.is_selected());

        f.world.insert_resource(UiSelection { current: None });
        f.control.on_enable(&mut f.world);
        assert!(!f.control.is_selected());
    }

    #[test]
    fn test_slider_toggle_and_nudge() {
        let mut f = fixture();
        f.control.set_speed_from_slider(&mut f.world, Some(1.5));
        assert_eq!(speed(&f.world, f.target), Some(1.5));
        f.control.set_speed_from_slider(&mut f.world, None);
        assert_eq!(f.control.current_speed(), 1.5);

        f.control.nudge_speed(&mut f.world, 0.25);
        assert_eq!(speed(&f.world, f.target), Some(1.75));

        f.control.apply_toggle_speed(&mut f.world, Some(true));
        assert_eq!(f.control.current_speed(), 2.0);
        f.control.apply_toggle_speed(&mut f.world, Some(false));
        assert_eq!(f.control.current_speed(), 0.0);
        f.control.apply_toggle_speed(&mut f.world, None);
        assert_eq!(f.control.current_speed(), 0.0);
    }

    #[test]
    fn test_speed_preserves_other_overrides() {
        let mut f = fixture();
        {
            let mut renderer = f.world.get_mut::<MeshRenderer>(f.target).unwrap();
            let mut block = renderer.property_block();
            block.set_float("_ShellIndex", 3.0);
            renderer.set_property_block(block);
        }
        f.control.set_speed(&mut f.world, 4.0);
        let block = f.world.get::<MeshRenderer>(f.target).unwrap().property_block();
        assert_eq!(block.get_float("_ShellIndex"), Some(3.0));
        assert_eq!(block.get_float(DEFAULT_SPEED_PROPERTY), Some(4.0));
    }

    #[test]
    fn test_missing_targets_are_skipped() {
        let mut f = fixture();
        f.world.despawn(f.target);
        f.world.despawn(f.shown);
        f.control.select(&mut f.world);
        assert_eq!(f.control.current_speed(), 2.0);
        assert_eq!(f.world.get::<Active>(f.hidden), Some(&Active(false)));
    }

    #[test]
    fn test_toggle_on_emits_additional_action() {
        let mut f = fixture();
        f.control.on_toggle(&mut f.world, false);
        assert!(drain(&mut f.world).is_empty());
        f.control.on_toggle(&mut f.world, true);
        assert_eq!(
            drain(&mut f.world),
            vec![SelectionEvent::AdditionalAction(f.control.control)]
        );
    }

    #[test]
    fn test_awake_and_validate() {
        let mut f = fixture();
        f.control.speed_on_deselect = 0.5;
        f.control.on_awake(&mut f.world);
        assert_eq!(speed(&f.world, f.target), Some(0.5));

        f.control.speed_property = "_FlowSpeed".to_string();
        f.control.on_validate(&mut f.world);
        let block = f.world.get::<MeshRenderer>(f.target).unwrap().property_block();
        assert_eq!(block.get_float("_FlowSpeed"), Some(0.5));
    }

    #[test]
    fn test_from_config() {
        let mut world = World::new();
        let owner = world.spawn_empty().id();
        let config = UiConfig {
            speed_on_select: 5.0,
            ..UiConfig::default()
        };
        let control = SelectionSpeedControl::from_config(owner, &config);
        assert_eq!(control.speed_on_select, 5.0);
        assert_eq!(control.speed_property, DEFAULT_SPEED_PROPERTY);
    }
}
