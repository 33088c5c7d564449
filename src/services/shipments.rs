//! Shipment (remito) workflow: ingress and egress documents with the
//! Pending -> Approved | Voided state machine, each transition driving the
//! location ledger and pallet registry in one transaction.

use crate::{
    db::DbPool,
    entities::{
        pallet::{self, PalletCompleteness},
        shipment::{self, ShipmentOrigin, ShipmentStatus, ShipmentType},
        shipment_line,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{locations, pallets},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngressLineInput {
    pub product_id: Uuid,
    pub lot_code: String,
    pub quantity: Decimal,
    pub completeness: PalletCompleteness,
    pub slot_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIngressInput {
    pub client_id: Uuid,
    pub depot_id: Uuid,
    pub origin: ShipmentOrigin,
    #[validate(length(min = 1, max = 64))]
    pub document_number: String,
    pub notes: Option<String>,
    pub operator_id: Uuid,
    pub lines: Vec<IngressLineInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEgressInput {
    pub client_id: Uuid,
    pub depot_id: Uuid,
    pub origin: ShipmentOrigin,
    #[validate(length(min = 1, max = 64))]
    pub document_number: String,
    pub notes: Option<String>,
    pub operator_id: Uuid,
    /// Existing active pallets already resident in slots.
    pub pallet_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ShipmentFilters {
    pub shipment_type: Option<ShipmentType>,
    pub client_id: Option<Uuid>,
    pub depot_id: Option<Uuid>,
    pub status: Option<ShipmentStatus>,
}

/// A shipment document with its ordered lines.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentWithLines {
    pub shipment: shipment::Model,
    pub lines: Vec<shipment_line::Model>,
}

/// Service for the shipment document workflow.
#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a pending ingress document. Per line, atomically: the target
    /// slot is reserved, the pallet is materialized referencing it, and the
    /// line is linked to the pallet. Any non-free target slot aborts the
    /// whole creation; no partial document is ever visible.
    #[instrument(skip(self, input), fields(document_number = %input.document_number))]
    pub async fn create_ingress(
        &self,
        input: CreateIngressInput,
    ) -> Result<shipment::Model, ServiceError> {
        input.validate()?;
        validate_lines(&input.lines)?;
        let db = &*self.db_pool;

        let created = db
            .transaction::<_, shipment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let shipment = insert_document(
                        txn,
                        ShipmentType::Ingress,
                        input.origin,
                        input.document_number,
                        input.client_id,
                        input.depot_id,
                        input.operator_id,
                        input.notes,
                    )
                    .await?;

                    for (idx, line) in input.lines.into_iter().enumerate() {
                        let created_pallet = pallets::create_on(
                            txn,
                            pallets::NewPallet {
                                product_id: line.product_id,
                                lot_code: line.lot_code.clone(),
                                quantity: line.quantity,
                                completeness: line.completeness,
                                slot_id: line.slot_id,
                            },
                        )
                        .await?;

                        // Aborts the whole creation when the slot is not free.
                        locations::reserve(txn, line.slot_id, created_pallet.id).await?;

                        shipment_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            shipment_id: Set(shipment.id),
                            position: Set((idx + 1) as i32),
                            product_id: Set(line.product_id),
                            lot_code: Set(line.lot_code),
                            quantity: Set(line.quantity),
                            pallet_id: Set(Some(created_pallet.id)),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    Ok(shipment)
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::ShipmentCreated {
                shipment_id: created.id,
                shipment_type: ShipmentType::Ingress,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Creates a pending egress document from existing pallet ids, copying
    /// each pallet's product/lot/quantity onto its line. Slot state is not
    /// touched until approval. Ids that no longer resolve are skipped, not
    /// rejected -- deliberate leniency inherited from the field workflow.
    #[instrument(skip(self, input), fields(document_number = %input.document_number))]
    pub async fn create_egress(
        &self,
        input: CreateEgressInput,
    ) -> Result<shipment::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let created = db
            .transaction::<_, shipment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let shipment = insert_document(
                        txn,
                        ShipmentType::Egress,
                        input.origin,
                        input.document_number,
                        input.client_id,
                        input.depot_id,
                        input.operator_id,
                        input.notes,
                    )
                    .await?;

                    let mut position = 0i32;
                    for pallet_id in input.pallet_ids {
                        let found = pallet::Entity::find_by_id(pallet_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?;
                        let Some(found) = found else {
                            warn!(%pallet_id, "skipping unknown pallet id on egress line");
                            continue;
                        };

                        position += 1;
                        shipment_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            shipment_id: Set(shipment.id),
                            position: Set(position),
                            product_id: Set(found.product_id),
                            lot_code: Set(found.lot_code),
                            quantity: Set(found.quantity),
                            pallet_id: Set(Some(found.id)),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    }

                    Ok(shipment)
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::ShipmentCreated {
                shipment_id: created.id,
                shipment_type: ShipmentType::Egress,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Approves a pending document, stamping the approver. Ingress: every
    /// line's slot goes Reserved -> Occupied. Egress: every line's slot (if
    /// any) goes Occupied -> Free and the pallet is deactivated. All lines
    /// commit in one unit; a failure partway rolls everything back.
    #[instrument(skip(self))]
    pub async fn approve(
        &self,
        shipment_id: Uuid,
        approver_id: Uuid,
    ) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;

        let updated = db
            .transaction::<_, shipment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let document = shipment::Entity::find_by_id(shipment_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Shipment {} not found", shipment_id))
                        })?;

                    // Guarded transition: only a Pending document can be
                    // approved, checked against the stored row at commit time.
                    let guard = shipment::Entity::update_many()
                        .col_expr(
                            shipment::Column::Status,
                            Expr::value(ShipmentStatus::Approved),
                        )
                        .col_expr(shipment::Column::ApproverId, Expr::value(Some(approver_id)))
                        .filter(shipment::Column::Id.eq(shipment_id))
                        .filter(shipment::Column::Status.eq(ShipmentStatus::Pending))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if guard.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "shipment {} is not pending (current status: {})",
                            shipment_id, document.status
                        )));
                    }

                    let lines = lines_of(txn, shipment_id).await?;

                    match document.shipment_type {
                        ShipmentType::Ingress => {
                            for line in &lines {
                                let pallet_id = line.pallet_id.ok_or_else(|| {
                                    ServiceError::InternalError(format!(
                                        "ingress line {} has no pallet",
                                        line.id
                                    ))
                                })?;
                                let found = pallet::Entity::find_by_id(pallet_id)
                                    .one(txn)
                                    .await
                                    .map_err(ServiceError::db_error)?
                                    .ok_or_else(|| {
                                        ServiceError::InternalError(format!(
                                            "pallet {} missing for ingress line {}",
                                            pallet_id, line.id
                                        ))
                                    })?;
                                let slot_id = found.slot_id.ok_or_else(|| {
                                    ServiceError::InternalError(format!(
                                        "pallet {} lost its reserved slot",
                                        pallet_id
                                    ))
                                })?;
                                locations::occupy(txn, slot_id).await?;
                            }
                        }
                        ShipmentType::Egress => {
                            for line in &lines {
                                let Some(pallet_id) = line.pallet_id else {
                                    continue;
                                };
                                let found = pallet::Entity::find_by_id(pallet_id)
                                    .one(txn)
                                    .await
                                    .map_err(ServiceError::db_error)?;
                                let Some(found) = found else {
                                    warn!(%pallet_id, "pallet missing at egress approval; line skipped");
                                    continue;
                                };
                                if let Some(slot_id) = found.slot_id {
                                    locations::release(txn, slot_id).await?;
                                }
                                pallets::deactivate_on(txn, found).await?;
                            }
                        }
                    }

                    shipment::Entity::find_by_id(shipment_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::InternalError(format!(
                                "shipment {} vanished during approval",
                                shipment_id
                            ))
                        })
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::ShipmentApproved {
                shipment_id: updated.id,
                shipment_type: updated.shipment_type,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Voids a pending document. Ingress: the ingress never happened, so
    /// every created pallet is deleted outright and its slot freed. Egress:
    /// nothing physical was touched before approval, so only the document
    /// state flips.
    #[instrument(skip(self))]
    pub async fn void(&self, shipment_id: Uuid) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;

        let updated = db
            .transaction::<_, shipment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let document = shipment::Entity::find_by_id(shipment_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Shipment {} not found", shipment_id))
                        })?;

                    let guard = shipment::Entity::update_many()
                        .col_expr(
                            shipment::Column::Status,
                            Expr::value(ShipmentStatus::Voided),
                        )
                        .filter(shipment::Column::Id.eq(shipment_id))
                        .filter(shipment::Column::Status.eq(ShipmentStatus::Pending))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    if guard.rows_affected == 0 {
                        return Err(ServiceError::InvalidState(format!(
                            "shipment {} is not pending (current status: {})",
                            shipment_id, document.status
                        )));
                    }

                    if document.shipment_type == ShipmentType::Ingress {
                        for line in lines_of(txn, shipment_id).await? {
                            let Some(pallet_id) = line.pallet_id else {
                                continue;
                            };
                            let found = pallet::Entity::find_by_id(pallet_id)
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                            let Some(found) = found else {
                                continue;
                            };

                            if let Some(slot_id) = found.slot_id {
                                locations::release_any(txn, slot_id).await?;
                            }

                            // The pallet never really existed; remove it and
                            // the line's reference to it.
                            pallet::Entity::delete_by_id(found.id)
                                .exec(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                            shipment_line::Entity::update_many()
                                .col_expr(
                                    shipment_line::Column::PalletId,
                                    Expr::value(Option::<Uuid>::None),
                                )
                                .filter(shipment_line::Column::Id.eq(line.id))
                                .exec(txn)
                                .await
                                .map_err(ServiceError::db_error)?;
                        }
                    }

                    shipment::Entity::find_by_id(shipment_id)
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::InternalError(format!(
                                "shipment {} vanished during void",
                                shipment_id
                            ))
                        })
                })
            })
            .await
            .map_err(ServiceError::from_transaction)?;

        self.event_sender
            .send(Event::ShipmentVoided {
                shipment_id: updated.id,
                shipment_type: updated.shipment_type,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, shipment_id: Uuid) -> Result<ShipmentWithLines, ServiceError> {
        let db = &*self.db_pool;

        let document = shipment::Entity::find_by_id(shipment_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Shipment {} not found", shipment_id)))?;

        let lines = lines_of(db, shipment_id).await?;

        Ok(ShipmentWithLines {
            shipment: document,
            lines,
        })
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filters: ShipmentFilters,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = shipment::Entity::find();
        if let Some(shipment_type) = filters.shipment_type {
            query = query.filter(shipment::Column::ShipmentType.eq(shipment_type));
        }
        if let Some(client_id) = filters.client_id {
            query = query.filter(shipment::Column::ClientId.eq(client_id));
        }
        if let Some(depot_id) = filters.depot_id {
            query = query.filter(shipment::Column::DepotId.eq(depot_id));
        }
        if let Some(status) = filters.status {
            query = query.filter(shipment::Column::Status.eq(status));
        }

        query
            .order_by_desc(shipment::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)
    }
}

/// Every line is checked before any state changes.
fn validate_lines(lines: &[IngressLineInput]) -> Result<(), ServiceError> {
    for (idx, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "line {}: quantity must be positive",
                idx + 1
            )));
        }
        if line.lot_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "line {}: lot code must not be empty",
                idx + 1
            )));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_document<C>(
    conn: &C,
    shipment_type: ShipmentType,
    origin: ShipmentOrigin,
    document_number: String,
    client_id: Uuid,
    depot_id: Uuid,
    operator_id: Uuid,
    notes: Option<String>,
) -> Result<shipment::Model, ServiceError>
where
    C: ConnectionTrait,
{
    shipment::ActiveModel {
        id: Set(Uuid::new_v4()),
        shipment_type: Set(shipment_type),
        origin: Set(origin),
        document_number: Set(document_number),
        status: Set(ShipmentStatus::Pending),
        client_id: Set(client_id),
        depot_id: Set(depot_id),
        operator_id: Set(operator_id),
        approver_id: Set(None),
        notes: Set(notes),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(ServiceError::db_error)
}

async fn lines_of<C>(conn: &C, shipment_id: Uuid) -> Result<Vec<shipment_line::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    shipment_line::Entity::find()
        .filter(shipment_line::Column::ShipmentId.eq(shipment_id))
        .order_by_asc(shipment_line::Column::Position)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}
