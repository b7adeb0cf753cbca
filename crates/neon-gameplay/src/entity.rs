//! Entity model with arena-based storage.

use ahash::AHashMap;
use neon_common::{Color, EntityError, EntityId, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Result type for entity operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Mutually exclusive power-up state of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerForm {
    /// No power-up
    #[default]
    Normal,
    /// Low gravity and continuous thrust instead of jumping
    Flight,
    /// Heavier shots
    Tank,
    /// Destroys hazards on contact and takes no damage
    Invincible,
}

impl PlayerForm {
    /// Forms a powerup can grant.
    pub const POWERUPS: [Self; 3] = [Self::Flight, Self::Tank, Self::Invincible];

    /// HUD label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Flight => "FLIGHT",
            Self::Tank => "TANK",
            Self::Invincible => "INVINCIBLE",
        }
    }
}

/// Horizontal facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing -x
    Left,
    /// Facing +x
    #[default]
    Right,
}

impl Facing {
    /// Facing toward a signed horizontal offset; zero keeps facing left.
    #[must_use]
    pub fn toward(dx: f32) -> Self {
        if dx > 0.0 {
            Self::Right
        } else {
            Self::Left
        }
    }

    /// +1.0 for right, -1.0 for left.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Who fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileOwner {
    /// Player shot; damages hazards
    Player,
    /// Boss shot; purely visual threat
    Boss,
}

/// Player-only state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current power-up form
    pub form: PlayerForm,
    /// Set by landing resolution, cleared every physics step
    pub on_ground: bool,
    /// Bottom edge before this tick's integration
    pub prev_bottom: f32,
}

/// Projectile-only state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// Who fired it
    pub owner: ProjectileOwner,
    /// Ticks lived so far
    pub age: u32,
}

/// Particle-only state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleState {
    /// Remaining life, starts at 1.0
    pub life: f32,
    /// Life lost per tick
    pub decay: f32,
}

/// Kind of simulated object, with kind-specific payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player avatar
    Player(PlayerState),
    /// Hovering enemy that drifts toward the player
    EnemyDrone,
    /// Walking enemy affected by gravity
    EnemyGlitchWalker,
    /// Multi-phase boss
    Boss,
    /// Shot
    Projectile(ProjectileState),
    /// Form pickup
    Powerup,
    /// Decaying visual spark
    Particle(ParticleState),
    /// Solid ground or floating platform (top surface only)
    Platform,
    /// Static ground hazard
    Spike,
    /// Level exit
    Portal,
}

/// Payload-free discriminant of [`EntityKind`] for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Player character
    Player,
    /// Drone enemy
    EnemyDrone,
    /// Walker enemy
    EnemyGlitchWalker,
    /// Boss
    Boss,
    /// Projectile
    Projectile,
    /// Powerup pickup
    Powerup,
    /// Particle
    Particle,
    /// Platform or ground tile
    Platform,
    /// Spike
    Spike,
    /// Exit portal
    Portal,
}

impl EntityType {
    /// Whether touching this hurts the player.
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(
            self,
            Self::EnemyDrone | Self::EnemyGlitchWalker | Self::Boss | Self::Spike
        )
    }
}

impl EntityKind {
    /// Returns the discriminant.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        match self {
            Self::Player(_) => EntityType::Player,
            Self::EnemyDrone => EntityType::EnemyDrone,
            Self::EnemyGlitchWalker => EntityType::EnemyGlitchWalker,
            Self::Boss => EntityType::Boss,
            Self::Projectile(_) => EntityType::Projectile,
            Self::Powerup => EntityType::Powerup,
            Self::Particle(_) => EntityType::Particle,
            Self::Platform => EntityType::Platform,
            Self::Spike => EntityType::Spike,
            Self::Portal => EntityType::Portal,
        }
    }
}

/// A simulated object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    id: EntityId,
    /// Kind and kind-specific state
    pub kind: EntityKind,
    /// Bounding box
    pub rect: Rect,
    /// Velocity per tick
    pub velocity: Vec2,
    /// Display color
    pub color: Color,
    /// Facing
    pub facing: Facing,
    /// Current hit points, never negative
    hp: i32,
    /// Maximum hit points
    max_hp: i32,
    /// Removed at the end of the current tick when set
    marked_for_deletion: bool,
}

impl Entity {
    /// Creates an entity with 1 hp, no velocity, facing right.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, rect: Rect, color: Color) -> Self {
        Self {
            id,
            kind,
            rect,
            velocity: Vec2::ZERO,
            color,
            facing: Facing::Right,
            hp: 1,
            max_hp: 1,
            marked_for_deletion: false,
        }
    }

    /// Sets current and maximum hit points.
    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = hp.max(0);
        self.max_hp = self.hp;
        self
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Returns the entity's unique ID.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the discriminant.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.kind.entity_type()
    }

    /// Current hit points.
    #[must_use]
    pub const fn hp(&self) -> i32 {
        self.hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Overwrites current hit points, clamped to zero.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.max(0);
    }

    /// Applies damage; hit points bottom out at zero.
    pub fn damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    /// Checks if dead.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    /// Whether the entity is scheduled for removal.
    #[must_use]
    pub const fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    /// Schedules removal at the end of the tick.
    pub fn mark_for_deletion(&mut self) {
        self.marked_for_deletion = true;
    }

    /// Forces hit points to zero and schedules removal.
    pub fn destroy(&mut self) {
        self.hp = 0;
        self.marked_for_deletion = true;
    }

    /// Player state, if this is the player.
    #[must_use]
    pub fn player_state(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable player state, if this is the player.
    pub fn player_state_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Current form if this is the player, otherwise Normal.
    #[must_use]
    pub fn form(&self) -> PlayerForm {
        self.player_state().map_or(PlayerForm::Normal, |s| s.form)
    }
}

/// Arena-based entity storage for efficient allocation and lookup.
///
/// Uses a free list for slot reuse and a hash map from ID to slot. Iteration
/// walks slots in index order, which is stable for the duration of a tick.
#[derive(Debug, Default, Clone)]
pub struct EntityArena {
    /// Storage slots for entities
    entities: Vec<Option<Entity>>,
    /// Free slot indices for reuse
    free_list: Vec<usize>,
    /// Map from EntityId to slot index for fast lookup
    id_to_index: AHashMap<EntityId, usize>,
}

impl EntityArena {
    /// Creates a new empty entity arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_index.len()
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_index.is_empty()
    }

    /// Returns the total slot count (including free slots).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.len()
    }

    /// Inserts an entity and returns its ID.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();

        let index = if let Some(free_index) = self.free_list.pop() {
            self.entities[free_index] = Some(entity);
            free_index
        } else {
            let index = self.entities.len();
            self.entities.push(Some(entity));
            index
        };

        self.id_to_index.insert(id, index);
        id
    }

    /// Removes an entity by ID and returns it.
    pub fn despawn(&mut self, id: EntityId) -> EntityResult<Entity> {
        let index = self
            .id_to_index
            .remove(&id)
            .ok_or(EntityError::NotFound(id))?;

        let entity = self.entities[index]
            .take()
            .ok_or(EntityError::AlreadyDespawned(id))?;

        self.free_list.push(index);
        Ok(entity)
    }

    /// Gets a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> EntityResult<&Entity> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;

        self.entities[*index]
            .as_ref()
            .ok_or(EntityError::NotFound(id))
    }

    /// Gets a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> EntityResult<&mut Entity> {
        let index = self.id_to_index.get(&id).ok_or(EntityError::NotFound(id))?;

        self.entities[*index]
            .as_mut()
            .ok_or(EntityError::NotFound(id))
    }

    /// Checks if an entity with the given ID exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    /// Returns an iterator over all live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter_map(|opt| opt.as_ref())
    }

    /// Returns a mutable iterator over all live entities in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut().filter_map(|opt| opt.as_mut())
    }

    /// Returns an iterator over entities of a specific type.
    pub fn iter_by_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.iter().filter(move |e| e.entity_type() == entity_type)
    }

    /// Collects the IDs of entities matching a predicate, in slot order.
    pub fn ids_where(&self, mut predicate: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
        self.iter()
            .filter(|e| predicate(e))
            .map(Entity::id)
            .collect()
    }

    /// Removes every entity marked for deletion and returns them.
    pub fn remove_marked(&mut self) -> Vec<Entity> {
        let marked = self.ids_where(Entity::is_marked_for_deletion);
        marked
            .into_iter()
            .filter_map(|id| self.despawn(id).ok())
            .collect()
    }

    /// Clears all entities from the arena.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.free_list.clear();
        self.id_to_index.clear();
    }
}

impl Extend<Entity> for EntityArena {
    fn extend<T: IntoIterator<Item = Entity>>(&mut self, iter: T) {
        for entity in iter {
            self.spawn(entity);
        }
    }
}
