// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workspace manager: owner of the workspace graph.
//!
//! All mutations run under one async mutex, which also guards the live
//! views, so the eviction sweep and commands never interleave. After a
//! graph mutation the new graph is published as the read snapshot and
//! queued for saving before the lock is released; the caller then waits
//! for the save outside the lock. A failed save is reported to the caller
//! but the in-memory change stands.

use crate::error::ManagerError;
use crate::lifecycle::{SessionLifecycle, ViewInfo, ViewKey};
use crate::persist::Persister;
use berth_adapters::{PartitionStore, ViewAdapter, ViewRequest};
use berth_core::{
    resolve_key, Clock, EvictionReason, IdGen, IsolationMode, ManagerConfig, ManagerEvent,
    PartitionInfo, PartitionKey, PartitionPatch, PartitionRecord, Service, ServiceId,
    ServicePatch, ServiceSpec, Settings, SettingsPatch, WindowId, WindowRecord, WindowSpec,
    Workspace, WorkspaceGraph, WorkspaceId, WorkspacePatch, WorkspaceSpec,
};
use berth_storage::{Loaded, Store};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// External collaborators of the manager
pub struct ManagerDeps<V, P> {
    pub views: V,
    pub partitions: P,
    pub store: Arc<dyn Store>,
}

struct State<V> {
    graph: WorkspaceGraph,
    lifecycle: SessionLifecycle<V>,
    windows: BTreeMap<WindowId, WindowRecord>,
}

/// Coordinates the graph, partitions, live views and persistence
pub struct WorkspaceManager<V, P, C, G> {
    state: Mutex<State<V>>,
    snapshot: RwLock<Arc<WorkspaceGraph>>,
    partitions: P,
    persister: Persister,
    events: broadcast::Sender<ManagerEvent>,
    config: ManagerConfig,
    clock: C,
    ids: G,
}

impl<V, P, C, G> WorkspaceManager<V, P, C, G>
where
    V: ViewAdapter,
    P: PartitionStore,
    C: Clock,
    G: IdGen,
{
    /// Load the graph and start the persistence writer.
    ///
    /// Never fails: a missing or unusable record yields a fresh graph with
    /// one active "Personal" workspace, which is saved immediately.
    pub async fn open(deps: ManagerDeps<V, P>, config: ManagerConfig, clock: C, ids: G) -> Self {
        let fresh = |ids: &G, clock: &C| {
            WorkspaceGraph::with_default_workspace(WorkspaceId::new(ids.next()), clock.utc_now())
        };
        let (graph, save_now) = match deps.store.load() {
            Ok(Loaded::Found(graph)) => (graph, false),
            Ok(Loaded::Missing) => {
                tracing::info!("no workspace record, creating default workspace");
                (fresh(&ids, &clock), true)
            }
            Ok(Loaded::Quarantined { backup, reason }) => {
                tracing::warn!(
                    reason,
                    backup = ?backup,
                    "workspace record unusable, starting with default workspace"
                );
                (fresh(&ids, &clock), true)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read workspace record, running in memory");
                (fresh(&ids, &clock), false)
            }
        };

        tracing::info!(
            workspaces = graph.workspaces.len(),
            active = ?graph.active_workspace_id,
            max_active_views = config.max_active_views,
            "workspace graph loaded"
        );

        let snapshot = Arc::new(graph.clone());
        let persister = Persister::spawn(deps.store);
        if save_now {
            if let Err(e) = persister.save(Arc::clone(&snapshot)).await {
                tracing::error!(error = %e, "failed to save default workspace graph");
            }
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(State {
                graph,
                lifecycle: SessionLifecycle::new(deps.views, config.max_active_views),
                windows: BTreeMap::new(),
            }),
            snapshot: RwLock::new(snapshot),
            partitions: deps.partitions,
            persister,
            events,
            config,
            clock,
            ids,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }

    /// The latest committed graph.
    pub fn graph(&self) -> Arc<WorkspaceGraph> {
        Arc::clone(&self.snapshot.read())
    }

    // -- workspaces --

    pub fn list_workspaces(&self) -> Vec<Workspace> {
        self.graph().workspaces.clone()
    }

    pub fn get_workspace(&self, id: &str) -> Result<Workspace, ManagerError> {
        self.graph()
            .workspace(id)
            .cloned()
            .ok_or_else(|| ManagerError::WorkspaceNotFound(id.to_string()))
    }

    pub fn get_active_workspace(&self) -> Option<Workspace> {
        self.graph().active().cloned()
    }

    /// Create a workspace. The first workspace of an empty graph becomes active.
    pub async fn create_workspace(&self, spec: WorkspaceSpec) -> Result<Workspace, ManagerError> {
        let name = validate_name("workspace name", &spec.name)?;
        let mut state = self.state.lock().await;

        let id = WorkspaceId::new(self.ids.next());
        let mut workspace = Workspace::new(
            id.clone(),
            WorkspaceSpec { name, ..spec },
            self.config.default_isolation_mode,
            self.clock.utc_now(),
        );
        let mut events = vec![ManagerEvent::WorkspaceCreated {
            workspace_id: id.clone(),
        }];
        if state.graph.workspaces.is_empty() {
            workspace.is_active = true;
            state.graph.active_workspace_id = Some(id.clone());
            events.push(ManagerEvent::WorkspaceSwitched {
                from: None,
                to: id.clone(),
            });
        }
        state.graph.workspaces.push(workspace.clone());

        tracing::info!(workspace_id = %id, name = %workspace.name, "workspace created");
        self.commit(state, events).await?;
        Ok(workspace)
    }

    /// Make `id` the active workspace.
    pub async fn switch_workspace(&self, id: &str) -> Result<Workspace, ManagerError> {
        let mut state = self.state.lock().await;
        let previous = state
            .graph
            .activate(id, self.clock.utc_now())
            .ok_or_else(|| ManagerError::WorkspaceNotFound(id.to_string()))?;
        let workspace = find_workspace(&state.graph, id)?.clone();

        let mut events = Vec::new();
        if previous.as_ref() != Some(&workspace.id) {
            events.push(ManagerEvent::WorkspaceSwitched {
                from: previous,
                to: workspace.id.clone(),
            });
        }
        self.commit(state, events).await?;
        Ok(workspace)
    }

    /// Apply a partial update. Changing the isolation mode closes the
    /// workspace's live views, since their partition keys change.
    pub async fn update_workspace(
        &self,
        id: &str,
        patch: WorkspacePatch,
    ) -> Result<Workspace, ManagerError> {
        if let Some(name) = &patch.name {
            validate_name("workspace name", name)?;
        }
        let mut state = self.state.lock().await;
        let st = &mut *state;

        let workspace = st
            .graph
            .workspace_mut(id)
            .ok_or_else(|| ManagerError::WorkspaceNotFound(id.to_string()))?;
        let isolation_changed = workspace.apply(patch);
        let updated = workspace.clone();

        let mut events = Vec::new();
        if isolation_changed {
            let live = st.lifecycle.views_in_workspace(id);
            events.extend(close_views(&mut st.lifecycle, live).await);
            st.graph.prune_partitions();
            tracing::info!(workspace_id = id, mode = %updated.isolation_mode, "isolation mode changed");
        }
        events.push(ManagerEvent::WorkspaceUpdated {
            workspace_id: updated.id.clone(),
        });
        self.commit(state, events).await?;
        Ok(updated)
    }

    /// Delete a workspace, its services, windows and live views.
    ///
    /// No other workspace is activated in its place.
    pub async fn delete_workspace(&self, id: &str) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        let st = &mut *state;
        find_workspace(&st.graph, id)?;

        let live = st.lifecycle.views_in_workspace(id);
        let mut events = close_views(&mut st.lifecycle, live).await;

        let removed = st.graph.remove(id);
        let doomed: Vec<WindowId> = st
            .windows
            .values()
            .filter(|w| w.workspace_id == id)
            .map(|w| w.id.clone())
            .collect();
        for window_id in doomed {
            st.windows.remove(&window_id);
            events.push(ManagerEvent::WindowClosed { window_id });
        }
        events.push(ManagerEvent::WorkspaceDeleted {
            workspace_id: WorkspaceId::new(id),
        });

        tracing::info!(
            workspace_id = id,
            services = removed.map(|w| w.services.len()).unwrap_or_default(),
            "workspace deleted"
        );
        self.commit(state, events).await
    }

    // -- services --

    pub async fn add_service(
        &self,
        workspace_id: &str,
        spec: ServiceSpec,
    ) -> Result<Service, ManagerError> {
        let name = validate_name("service name", &spec.name)?;
        validate_url(&spec.url)?;
        let mut state = self.state.lock().await;

        let workspace = state
            .graph
            .workspace_mut(workspace_id)
            .ok_or_else(|| ManagerError::WorkspaceNotFound(workspace_id.to_string()))?;
        let service = Service::new(ServiceId::new(self.ids.next()), ServiceSpec { name, ..spec });
        workspace.services.push(service.clone());

        let events = vec![ManagerEvent::ServiceAdded {
            workspace_id: workspace.id.clone(),
            service_id: service.id.clone(),
        }];
        self.commit(state, events).await?;
        Ok(service)
    }

    /// Apply a partial update. Changing the URL or disabling the service
    /// closes its live view.
    pub async fn update_service(
        &self,
        workspace_id: &str,
        service_id: &str,
        patch: ServicePatch,
    ) -> Result<Service, ManagerError> {
        if let Some(name) = &patch.name {
            validate_name("service name", name)?;
        }
        if let Some(url) = &patch.url {
            validate_url(url)?;
        }
        let mut state = self.state.lock().await;
        let st = &mut *state;

        let service = st
            .graph
            .workspace_mut(workspace_id)
            .ok_or_else(|| ManagerError::WorkspaceNotFound(workspace_id.to_string()))?
            .service_mut(service_id)
            .ok_or_else(|| service_not_found(workspace_id, service_id))?;
        let invalidated = service.apply(patch);
        let updated = service.clone();

        let mut events = Vec::new();
        if invalidated {
            let key = ViewKey::new(workspace_id, updated.id.clone());
            events.extend(close_views(&mut st.lifecycle, vec![key]).await);
        }
        events.push(ManagerEvent::ServiceUpdated {
            workspace_id: WorkspaceId::new(workspace_id),
            service_id: updated.id.clone(),
        });
        self.commit(state, events).await?;
        Ok(updated)
    }

    /// Remove a service, closing its live view first.
    pub async fn remove_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        let st = &mut *state;
        find_service(&st.graph, workspace_id, service_id)?;

        let key = ViewKey::new(workspace_id, service_id);
        let mut events = close_views(&mut st.lifecycle, vec![key]).await;
        if let Some(workspace) = st.graph.workspace_mut(workspace_id) {
            workspace.services.retain(|s| s.id != service_id);
        }
        st.graph.prune_partitions();
        events.push(ManagerEvent::ServiceRemoved {
            workspace_id: WorkspaceId::new(workspace_id),
            service_id: ServiceId::new(service_id),
        });
        self.commit(state, events).await
    }

    // -- views --

    /// Materialize (or reuse) the view for a service in its partition.
    ///
    /// With `autoSwitchOnActivity` set, loading a service of an inactive
    /// workspace also switches to that workspace.
    pub async fn load_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<ViewInfo, ManagerError> {
        let mut state = self.state.lock().await;
        let st = &mut *state;

        let (workspace, service) = find_service(&st.graph, workspace_id, service_id)?;
        if !service.is_enabled {
            return Err(ManagerError::Validation(format!(
                "service {service_id} is disabled"
            )));
        }
        let partition = resolve_key(workspace, service);
        let request = ViewRequest {
            service_id: service.id.clone(),
            profile_dir: self.partitions.location(&partition),
            url: service.url.clone(),
            partition,
        };
        let ws_id = workspace.id.clone();
        let switch = st.graph.settings.auto_switch_on_activity && !workspace.is_active;

        let activation = st
            .lifecycle
            .activate(&ws_id, request, self.clock.epoch_ms())
            .await?;

        let mut events: Vec<ManagerEvent> = activation
            .evicted
            .iter()
            .map(|key| ManagerEvent::ViewEvicted {
                workspace_id: key.workspace_id.clone(),
                service_id: key.service_id.clone(),
                reason: EvictionReason::Capacity,
            })
            .collect();
        if activation.created {
            events.push(ManagerEvent::ViewActivated {
                workspace_id: activation.view.workspace_id.clone(),
                service_id: activation.view.service_id.clone(),
                partition: activation.view.partition.clone(),
            });
        }

        if switch {
            let previous = st.graph.activate(ws_id.as_str(), self.clock.utc_now()).flatten();
            events.push(ManagerEvent::WorkspaceSwitched {
                from: previous,
                to: ws_id,
            });
            self.commit(state, events).await?;
        } else {
            self.finish(state, events);
        }
        Ok(activation.view)
    }

    /// Close a service's view. Closing a service without a view is a no-op.
    pub async fn close_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        find_service(&state.graph, workspace_id, service_id)?;
        let key = ViewKey::new(workspace_id, service_id);
        let events = close_views(&mut state.lifecycle, vec![key]).await;
        self.finish(state, events);
        Ok(())
    }

    /// Record an interaction with a loaded service.
    pub async fn touch_service(
        &self,
        workspace_id: &str,
        service_id: &str,
    ) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        find_service(&state.graph, workspace_id, service_id)?;
        let key = ViewKey::new(workspace_id, service_id);
        if !state.lifecycle.touch(&key, self.clock.epoch_ms()) {
            return Err(ManagerError::ViewNotLoaded(service_id.to_string()));
        }
        Ok(())
    }

    /// Exempt a loaded service's view from eviction, or release it.
    pub async fn pin_service(
        &self,
        workspace_id: &str,
        service_id: &str,
        pinned: bool,
    ) -> Result<ViewInfo, ManagerError> {
        let mut state = self.state.lock().await;
        find_service(&state.graph, workspace_id, service_id)?;
        let key = ViewKey::new(workspace_id, service_id);
        if !state.lifecycle.set_pinned(&key, pinned) {
            return Err(ManagerError::ViewNotLoaded(service_id.to_string()));
        }
        state
            .lifecycle
            .info(&key)
            .ok_or_else(|| ManagerError::ViewNotLoaded(service_id.to_string()))
    }

    pub async fn list_views(&self) -> Vec<ViewInfo> {
        self.state.lock().await.lifecycle.list()
    }

    /// Evict views while their estimated memory exceeds the configured threshold.
    pub async fn run_eviction_sweep(&self) -> Vec<ViewKey> {
        let mut state = self.state.lock().await;
        let evicted = state
            .lifecycle
            .run_eviction_sweep(self.config.memory_threshold_bytes)
            .await;
        let events = evicted
            .iter()
            .map(|key| ManagerEvent::ViewEvicted {
                workspace_id: key.workspace_id.clone(),
                service_id: key.service_id.clone(),
                reason: EvictionReason::MemoryPressure,
            })
            .collect();
        self.finish(state, events);
        evicted
    }

    // -- partitions --

    /// Partitions derived from the graph, optionally for one workspace.
    pub async fn list_partitions(
        &self,
        workspace_id: Option<&str>,
    ) -> Result<Vec<PartitionInfo>, ManagerError> {
        let mut infos = {
            let state = self.state.lock().await;
            if let Some(id) = workspace_id {
                find_workspace(&state.graph, id)?;
            }
            state
                .graph
                .partition_keys()
                .into_iter()
                .filter(|(_, ws, _)| workspace_id.is_none_or(|id| ws.id == id))
                .map(|(key, ws, services)| {
                    let ids = services.iter().map(|s| s.id.clone()).collect();
                    partition_info(&state, key, ws, ids)
                })
                .collect::<Vec<_>>()
        };
        for info in &mut infos {
            info.usage_bytes = self.usage_bytes(&info.key).await;
        }
        Ok(infos)
    }

    /// Register metadata for a derived partition. Idempotent: an existing
    /// record is updated with any fields given.
    pub async fn create_partition(
        &self,
        workspace_id: &str,
        service_id: Option<&str>,
        patch: PartitionPatch,
    ) -> Result<PartitionInfo, ManagerError> {
        let mut state = self.state.lock().await;
        let workspace = find_workspace(&state.graph, workspace_id)?;
        let key = match service_id {
            Some(sid) => {
                let service = workspace
                    .service(sid)
                    .ok_or_else(|| service_not_found(workspace_id, sid))?;
                resolve_key(workspace, service)
            }
            None if workspace.isolation_mode == IsolationMode::Shared => {
                PartitionKey::new(workspace.id.as_str())
            }
            None => {
                return Err(ManagerError::Validation(format!(
                    "workspace {workspace_id} is isolated; partitions are per service"
                )))
            }
        };

        let now = self.clock.utc_now();
        upsert_record(&mut state.graph, &key, patch, now);
        let info = self.describe_partition(&state, &key)?;
        self.commit(state, vec![ManagerEvent::PartitionUpdated { partition: key }])
            .await?;
        Ok(self.with_usage(info).await)
    }

    /// Edit a partition's label or persistence flag.
    pub async fn update_partition(
        &self,
        key: &str,
        patch: PartitionPatch,
    ) -> Result<PartitionInfo, ManagerError> {
        let mut state = self.state.lock().await;
        if !state.graph.is_live_key(key) {
            return Err(ManagerError::PartitionNotFound(key.to_string()));
        }
        let key = PartitionKey::new(key);
        let now = self.clock.utc_now();
        upsert_record(&mut state.graph, &key, patch, now);
        let info = self.describe_partition(&state, &key)?;
        self.commit(state, vec![ManagerEvent::PartitionUpdated { partition: key }])
            .await?;
        Ok(self.with_usage(info).await)
    }

    /// Wipe one partition's persisted state, closing views bound to it first.
    pub async fn clear_partition(&self, key: &str) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        if !state.graph.is_live_key(key) {
            return Err(ManagerError::PartitionNotFound(key.to_string()));
        }
        let mut events = Vec::new();
        let result = self
            .clear_keys(&mut state, vec![PartitionKey::new(key)], &mut events)
            .await;
        self.finish(state, events);
        result.map(|_| ())
    }

    /// Clear every partition of a workspace, stopping at the first failure.
    pub async fn clear_workspace_data(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<PartitionKey>, ManagerError> {
        let mut state = self.state.lock().await;
        let keys = state
            .graph
            .workspace_partition_keys(workspace_id)
            .ok_or_else(|| ManagerError::WorkspaceNotFound(workspace_id.to_string()))?;
        let mut events = Vec::new();
        let result = self.clear_keys(&mut state, keys, &mut events).await;
        self.finish(state, events);
        result
    }

    // -- windows --

    pub async fn get_windows(
        &self,
        workspace_id: Option<&str>,
    ) -> Result<Vec<WindowRecord>, ManagerError> {
        let state = self.state.lock().await;
        if let Some(id) = workspace_id {
            find_workspace(&state.graph, id)?;
        }
        Ok(state
            .windows
            .values()
            .filter(|w| workspace_id.is_none_or(|id| w.workspace_id == id))
            .cloned()
            .collect())
    }

    /// Register a host window for a workspace. Windows are not persisted.
    pub async fn create_window(
        &self,
        workspace_id: &str,
        spec: WindowSpec,
    ) -> Result<WindowRecord, ManagerError> {
        let width = spec.width.unwrap_or(berth_core::window::DEFAULT_WIDTH);
        let height = spec.height.unwrap_or(berth_core::window::DEFAULT_HEIGHT);
        if width == 0 || height == 0 {
            return Err(ManagerError::Validation(
                "window dimensions must be non-zero".into(),
            ));
        }
        let mut state = self.state.lock().await;
        let workspace = find_workspace(&state.graph, workspace_id)?;
        let window = WindowRecord {
            id: WindowId::new(self.ids.next()),
            workspace_id: workspace.id.clone(),
            title: spec
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| workspace.name.clone()),
            width,
            height,
            created: self.clock.utc_now(),
        };
        state.windows.insert(window.id.clone(), window.clone());
        let events = vec![ManagerEvent::WindowCreated {
            window_id: window.id.clone(),
            workspace_id: window.workspace_id.clone(),
        }];
        self.finish(state, events);
        Ok(window)
    }

    pub async fn close_window(&self, window_id: &str) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        let window = state
            .windows
            .remove(window_id)
            .ok_or_else(|| ManagerError::WindowNotFound(window_id.to_string()))?;
        self.finish(
            state,
            vec![ManagerEvent::WindowClosed {
                window_id: window.id,
            }],
        );
        Ok(())
    }

    // -- settings --

    pub fn get_settings(&self) -> Settings {
        self.graph().settings.clone()
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings, ManagerError> {
        let mut state = self.state.lock().await;
        if let Some(default) = patch.default_workspace {
            state.graph.settings.default_workspace = if default.is_empty() {
                None
            } else {
                Some(find_workspace(&state.graph, &default)?.id.clone())
            };
        }
        if let Some(auto_switch) = patch.auto_switch_on_activity {
            state.graph.settings.auto_switch_on_activity = auto_switch;
        }
        let settings = state.graph.settings.clone();
        self.commit(state, vec![ManagerEvent::SettingsUpdated]).await?;
        Ok(settings)
    }

    // -- shutdown --

    /// Close every view, wipe non-persistent partitions and flush a final save.
    pub async fn shutdown(&self) -> Result<(), ManagerError> {
        let mut state = self.state.lock().await;
        let closed = state.lifecycle.close_all().await;
        let mut events: Vec<ManagerEvent> = closed
            .into_iter()
            .map(|key| ManagerEvent::ViewClosed {
                workspace_id: key.workspace_id,
                service_id: key.service_id,
            })
            .collect();

        let ephemeral: Vec<PartitionKey> = state
            .graph
            .partitions
            .iter()
            .filter(|p| !p.persistent)
            .map(|p| p.key.clone())
            .collect();
        for key in ephemeral {
            match self.partitions.clear(&key).await {
                Ok(()) => events.push(ManagerEvent::PartitionCleared { partition: key }),
                Err(e) => tracing::warn!(partition = %key, error = %e, "failed to wipe partition"),
            }
        }

        tracing::info!("workspace manager shut down");
        self.commit(state, events).await
    }

    // -- internals --

    /// Publish the mutated graph, queue its save, release the lock, then
    /// wait for the save.
    async fn commit(
        &self,
        state: MutexGuard<'_, State<V>>,
        events: Vec<ManagerEvent>,
    ) -> Result<(), ManagerError> {
        let graph = Arc::new(state.graph.clone());
        *self.snapshot.write() = Arc::clone(&graph);
        let ticket = self.persister.enqueue(graph);
        drop(state);
        self.publish(events);

        ticket.wait().await.map_err(|e| {
            self.publish(vec![ManagerEvent::PersistenceFailed {
                message: e.to_string(),
            }]);
            ManagerError::Persistence(e)
        })
    }

    /// Release the lock after a change that does not touch the graph.
    fn finish(&self, state: MutexGuard<'_, State<V>>, events: Vec<ManagerEvent>) {
        drop(state);
        self.publish(events);
    }

    fn publish(&self, events: Vec<ManagerEvent>) {
        for event in events {
            tracing::debug!(event = event.log_summary(), "event");
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }

    async fn clear_keys(
        &self,
        state: &mut State<V>,
        keys: Vec<PartitionKey>,
        events: &mut Vec<ManagerEvent>,
    ) -> Result<Vec<PartitionKey>, ManagerError> {
        let mut cleared = Vec::with_capacity(keys.len());
        for key in keys {
            let bound = state.lifecycle.views_in_partition(key.as_str());
            events.extend(close_views(&mut state.lifecycle, bound).await);
            self.partitions
                .clear(&key)
                .await
                .map_err(ManagerError::PartitionClear)?;
            events.push(ManagerEvent::PartitionCleared {
                partition: key.clone(),
            });
            cleared.push(key);
        }
        Ok(cleared)
    }

    fn describe_partition(
        &self,
        state: &State<V>,
        key: &PartitionKey,
    ) -> Result<PartitionInfo, ManagerError> {
        state
            .graph
            .partition_keys()
            .into_iter()
            .find(|(k, _, _)| k == key)
            .map(|(key, ws, services)| {
                let ids = services.iter().map(|s| s.id.clone()).collect();
                partition_info(state, key, ws, ids)
            })
            .ok_or_else(|| ManagerError::PartitionNotFound(key.to_string()))
    }

    async fn with_usage(&self, mut info: PartitionInfo) -> PartitionInfo {
        info.usage_bytes = self.usage_bytes(&info.key).await;
        info
    }

    async fn usage_bytes(&self, key: &PartitionKey) -> u64 {
        self.partitions.usage_bytes(key).await.unwrap_or_else(|e| {
            tracing::warn!(partition = %key, error = %e, "usage lookup failed");
            0
        })
    }
}

async fn close_views<V: ViewAdapter>(
    lifecycle: &mut SessionLifecycle<V>,
    keys: Vec<ViewKey>,
) -> Vec<ManagerEvent> {
    let mut events = Vec::new();
    for key in keys {
        if lifecycle.deactivate(&key).await {
            events.push(ManagerEvent::ViewClosed {
                workspace_id: key.workspace_id,
                service_id: key.service_id,
            });
        }
    }
    events
}

fn partition_info<V>(
    state: &State<V>,
    key: PartitionKey,
    workspace: &Workspace,
    service_ids: Vec<ServiceId>,
) -> PartitionInfo
where
    V: ViewAdapter,
{
    let record = state.graph.partition_record(key.as_str());
    PartitionInfo {
        active_views: state.lifecycle.views_in_partition(key.as_str()).len(),
        label: record.and_then(|r| r.label.clone()),
        persistent: record.is_none_or(|r| r.persistent),
        workspace_id: workspace.id.clone(),
        isolation_mode: workspace.isolation_mode,
        service_ids,
        usage_bytes: 0,
        key,
    }
}

fn upsert_record(
    graph: &mut WorkspaceGraph,
    key: &PartitionKey,
    patch: PartitionPatch,
    now: DateTime<Utc>,
) {
    // Empty label clears it
    let label = patch.label.map(|l| Some(l).filter(|l| !l.trim().is_empty()));
    match graph.partition_record_mut(key.as_str()) {
        Some(record) => {
            if let Some(label) = label {
                record.label = label;
            }
            if let Some(persistent) = patch.persistent {
                record.persistent = persistent;
            }
        }
        None => graph.partitions.push(PartitionRecord {
            key: key.clone(),
            label: label.flatten(),
            persistent: patch.persistent.unwrap_or(true),
            created: now,
        }),
    }
}

fn find_workspace<'a>(graph: &'a WorkspaceGraph, id: &str) -> Result<&'a Workspace, ManagerError> {
    graph
        .workspace(id)
        .ok_or_else(|| ManagerError::WorkspaceNotFound(id.to_string()))
}

fn find_service<'a>(
    graph: &'a WorkspaceGraph,
    workspace_id: &str,
    service_id: &str,
) -> Result<(&'a Workspace, &'a Service), ManagerError> {
    let workspace = find_workspace(graph, workspace_id)?;
    let service = workspace
        .service(service_id)
        .ok_or_else(|| service_not_found(workspace_id, service_id))?;
    Ok((workspace, service))
}

fn service_not_found(workspace_id: &str, service_id: &str) -> ManagerError {
    ManagerError::ServiceNotFound {
        workspace: workspace_id.to_string(),
        service: service_id.to_string(),
    }
}

fn validate_name(what: &str, name: &str) -> Result<String, ManagerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ManagerError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn validate_url(url: &str) -> Result<(), ManagerError> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ManagerError::Validation(format!("invalid url {url:?}: {e}")))
}

#[cfg(test)]
#[path = "manager_tests/mod.rs"]
mod tests;
