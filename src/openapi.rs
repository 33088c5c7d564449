use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::depots::list_depots,
        crate::handlers::depots::create_depot,
        crate::handlers::depots::get_depot,
        crate::handlers::depots::update_depot,
        crate::handlers::depots::depot_occupancy,
        crate::handlers::depots::free_slots,
        crate::handlers::depots::create_rack,
        crate::handlers::depots::delete_rack,
        crate::handlers::depots::overview,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::deactivate_client,
        crate::handlers::products::list_products,
        crate::handlers::products::list_products_by_client,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::deactivate_product,
        crate::handlers::pallets::list_pallets,
        crate::handlers::pallets::get_pallet,
        crate::handlers::movements::list_movements,
        crate::handlers::movements::move_pallet,
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::create_ingress,
        crate::handlers::shipments::create_egress,
        crate::handlers::shipments::approve_shipment,
        crate::handlers::shipments::void_shipment,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::depots::DepotResponse,
        crate::handlers::depots::RackResponse,
        crate::handlers::depots::SlotResponse,
        crate::handlers::depots::RackDetailResponse,
        crate::handlers::depots::DepotDetailResponse,
        crate::handlers::depots::FreeSlotResponse,
        crate::handlers::clients::ClientResponse,
        crate::handlers::products::ProductResponse,
        crate::handlers::pallets::PalletResponse,
        crate::handlers::movements::MovementResponse,
        crate::handlers::shipments::ShipmentResponse,
        crate::handlers::shipments::ShipmentLineResponse,
        crate::handlers::shipments::ShipmentDetailResponse,
        crate::handlers::shipments::ApproveShipmentRequest,
        crate::services::depots::CreateDepotInput,
        crate::services::depots::UpdateDepotInput,
        crate::services::depots::CreateRackInput,
        crate::services::clients::CreateClientInput,
        crate::services::clients::UpdateClientInput,
        crate::services::products::CreateProductInput,
        crate::services::products::UpdateProductInput,
        crate::services::movements::MovePalletInput,
        crate::services::shipments::CreateIngressInput,
        crate::services::shipments::IngressLineInput,
        crate::services::shipments::CreateEgressInput,
        crate::services::occupancy::OccupancySnapshot,
        crate::services::occupancy::DepotOccupancy,
        crate::services::occupancy::OverviewStats,
        crate::entities::slot::SlotStatus,
        crate::entities::pallet::PalletCompleteness,
        crate::entities::shipment::ShipmentType,
        crate::entities::shipment::ShipmentOrigin,
        crate::entities::shipment::ShipmentStatus,
    )),
    tags(
        (name = "depots", description = "Depots, racks and slot grids"),
        (name = "clients", description = "Client registry"),
        (name = "products", description = "Product registry"),
        (name = "pallets", description = "Pallet listings"),
        (name = "movements", description = "Internal pallet relocations"),
        (name = "shipments", description = "Ingress/egress documents")
    ),
    info(
        title = "Embalse API",
        description = "Warehouse depot management: racks, addressable slots, pallets, internal movements and ingress/egress shipment documents"
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
