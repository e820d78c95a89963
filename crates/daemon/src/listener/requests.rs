// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request dispatch: maps each protocol request onto the workspace manager.

use berth_adapters::{PartitionStore, ViewAdapter};
use berth_core::{Clock, IdGen};
use berth_engine::ManagerError;
use tracing::warn;

use super::ListenCtx;
use crate::protocol::{Request, Response, PROTOCOL_VERSION};

/// Convert a manager result into a response, reporting failures by kind.
fn reply<T>(result: Result<T, ManagerError>, ok: impl FnOnce(T) -> Response) -> Response {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            warn!(kind = %e.kind(), error = %e, "request failed");
            Response::Error {
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}

/// Handle a single request and return a response.
///
/// `Subscribe` is answered by the connection loop, not here.
pub(crate) async fn handle_request<V, P, C, G>(
    request: Request,
    ctx: &ListenCtx<V, P, C, G>,
) -> Response
where
    V: ViewAdapter,
    P: PartitionStore,
    C: Clock,
    G: IdGen,
{
    let manager = &ctx.manager;
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello {
                version: PROTOCOL_VERSION.to_string(),
            }
        }

        Request::Status => {
            let graph = manager.graph();
            Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                workspaces: graph.workspaces.len(),
                active_workspace: graph.active_workspace_id.clone(),
                active_views: manager.list_views().await.len(),
            }
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }

        Request::Subscribe => Response::Subscribed,

        // -- workspaces --
        Request::ListWorkspaces => Response::Workspaces {
            workspaces: manager.list_workspaces(),
        },
        Request::GetWorkspace { id } => reply(manager.get_workspace(&id), |w| {
            Response::Workspace {
                workspace: Some(Box::new(w)),
            }
        }),
        Request::GetActiveWorkspace => Response::Workspace {
            workspace: manager.get_active_workspace().map(Box::new),
        },
        Request::CreateWorkspace { spec } => {
            reply(manager.create_workspace(spec).await, workspace_response)
        }
        Request::UpdateWorkspace { id, patch } => {
            reply(manager.update_workspace(&id, patch).await, workspace_response)
        }
        Request::DeleteWorkspace { id } => {
            reply(manager.delete_workspace(&id).await, |()| Response::Ok)
        }
        Request::SwitchWorkspace { id } => {
            reply(manager.switch_workspace(&id).await, workspace_response)
        }

        // -- services --
        Request::AddService { workspace_id, spec } => {
            reply(manager.add_service(&workspace_id, spec).await, |s| {
                Response::Service {
                    service: Box::new(s),
                }
            })
        }
        Request::UpdateService {
            workspace_id,
            service_id,
            patch,
        } => reply(
            manager
                .update_service(&workspace_id, &service_id, patch)
                .await,
            |s| Response::Service {
                service: Box::new(s),
            },
        ),
        Request::RemoveService {
            workspace_id,
            service_id,
        } => reply(
            manager.remove_service(&workspace_id, &service_id).await,
            |()| Response::Ok,
        ),

        // -- views --
        Request::LoadService {
            workspace_id,
            service_id,
        } => reply(
            manager.load_service(&workspace_id, &service_id).await,
            |view| Response::View { view },
        ),
        Request::CloseService {
            workspace_id,
            service_id,
        } => reply(
            manager.close_service(&workspace_id, &service_id).await,
            |()| Response::Ok,
        ),
        Request::TouchService {
            workspace_id,
            service_id,
        } => reply(
            manager.touch_service(&workspace_id, &service_id).await,
            |()| Response::Ok,
        ),
        Request::PinService {
            workspace_id,
            service_id,
            pinned,
        } => reply(
            manager
                .pin_service(&workspace_id, &service_id, pinned)
                .await,
            |view| Response::View { view },
        ),
        Request::ListViews => Response::Views {
            views: manager.list_views().await,
        },
        Request::RunEvictionSweep => Response::Evicted {
            views: manager.run_eviction_sweep().await,
        },

        // -- partitions --
        Request::ListPartitions { workspace_id } => reply(
            manager.list_partitions(workspace_id.as_deref()).await,
            |partitions| Response::Partitions { partitions },
        ),
        Request::CreatePartition {
            workspace_id,
            service_id,
            patch,
        } => reply(
            manager
                .create_partition(&workspace_id, service_id.as_deref(), patch)
                .await,
            |partition| Response::Partition { partition },
        ),
        Request::UpdatePartition { key, patch } => reply(
            manager.update_partition(&key, patch).await,
            |partition| Response::Partition { partition },
        ),
        Request::ClearPartition { key } => {
            let cleared = key.clone();
            reply(manager.clear_partition(&key).await, |()| Response::Cleared {
                partitions: vec![cleared.into()],
            })
        }
        Request::ClearWorkspaceData { workspace_id } => reply(
            manager.clear_workspace_data(&workspace_id).await,
            |partitions| Response::Cleared { partitions },
        ),

        // -- windows --
        Request::GetWindows { workspace_id } => reply(
            manager.get_windows(workspace_id.as_deref()).await,
            |windows| Response::Windows { windows },
        ),
        Request::CreateWindow { workspace_id, spec } => reply(
            manager.create_window(&workspace_id, spec).await,
            |window| Response::Window { window },
        ),
        Request::CloseWindow { window_id } => {
            reply(manager.close_window(&window_id).await, |()| Response::Ok)
        }

        // -- settings --
        Request::GetSettings => Response::Settings {
            settings: manager.get_settings(),
        },
        Request::UpdateSettings { patch } => reply(
            manager.update_settings(patch).await,
            |settings| Response::Settings { settings },
        ),
    }
}

fn workspace_response(workspace: berth_core::Workspace) -> Response {
    Response::Workspace {
        workspace: Some(Box::new(workspace)),
    }
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
