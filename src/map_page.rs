use axum::response::Html;

use crate::dataset::DatasetConfig;

pub fn get_map_html(config: &DatasetConfig) -> Html<String> {
    let html = MAP_HTML.replace("<!-- TITLE_PLACEHOLDER -->", &config.title);
    Html(html)
}

// HTML template for the map page. All styling and popup decisions are
// made server-side; the script below only wires Leaflet to the JSON API.
const MAP_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title><!-- TITLE_PLACEHOLDER --> - RouteMap</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
    <link rel="stylesheet" href="https://unpkg.com/leaflet-fullscreen@1.0.2/dist/leaflet.fullscreen.css" />
    <style>
        body { margin: 0; padding: 0; font-family: Arial, sans-serif; }
        #map { height: 100vh; width: 100%; }
        .coordinate_display {
            position: absolute;
            bottom: 8px;
            right: 8px;
            z-index: 1000;
            padding: 4px 8px;
            background: rgba(255,255,255,0.85);
            border-radius: 4px;
            font: 12px/14px Arial, Helvetica, sans-serif;
        }
        .legend {
            padding: 6px 8px;
            background: rgba(255,255,255,0.9);
            box-shadow: 0 0 15px rgba(0,0,0,0.2);
            border-radius: 5px;
            font: 13px/18px Arial, Helvetica, sans-serif;
            max-height: 60vh;
            overflow-y: auto;
        }
        .legend h4 { margin: 0 0 5px; color: #777; }
        .legend i {
            display: inline-block;
            width: 18px;
            height: 4px;
            margin-right: 6px;
            vertical-align: middle;
        }
        .feature-popup h3 { margin: 0 0 6px; }
        .feature-popup p { margin: 3px 0; }
    </style>
</head>
<body>
    <div id="map"></div>
    <div id="coords" class="coordinate_display"></div>

    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <script src="https://unpkg.com/leaflet-fullscreen@1.0.2/dist/Leaflet.fullscreen.min.js"></script>
    <script>
        let map = null;
        const popup = L.popup({ autoPan: true, className: 'feature-popup' });

        function buildBaseLayer(def) {
            if (def.type === 'osm') {
                return L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
                    attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
                });
            }
            return L.tileLayer.wms(def.url, {
                layers: def.layers,
                format: 'image/png',
                attribution: def.attribution
            });
        }

        function featureStyle(feature) {
            const props = feature.properties || {};
            const style = { weight: props._style_width || 2 };
            if (props._style_color) {
                style.color = props._style_color;
            }
            return style;
        }

        async function postJson(url, body) {
            const response = await fetch(url, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(body)
            });
            return response.json();
        }

        // Applies the server's popup state to the Leaflet popup. The
        // server owns the open/closed decision; this only mirrors it.
        let applyingState = false;
        function applyPopupState(result) {
            applyingState = true;
            if (result.state === 'shown') {
                popup
                    .setLatLng([result.coordinate[0], result.coordinate[1]])
                    .setContent(result.html)
                    .openOn(map);
            } else {
                map.closePopup(popup);
            }
            applyingState = false;
        }

        async function sendClick(featureIndex, latlng) {
            const result = await postJson('/api/click', {
                feature_index: featureIndex,
                coordinate: [latlng.lat, latlng.lng]
            });
            applyPopupState(result);
        }

        async function init() {
            const config = await (await fetch('/api/config')).json();

            map = L.map('map', {
                center: config.view.center,
                zoom: config.view.zoom,
                maxBounds: [
                    [config.view.extent[0], config.view.extent[1]],
                    [config.view.extent[2], config.view.extent[3]]
                ],
                fullscreenControl: true
            });

            const baseLayers = {};
            config.base_layers.forEach(def => {
                const layer = buildBaseLayer(def);
                baseLayers[def.title] = layer;
                if (def.visible) layer.addTo(map);
            });

            L.control.scale().addTo(map);

            // Mouse position readout (EPSG:4326)
            map.on('mousemove', (e) => {
                document.getElementById('coords').textContent =
                    'Lat: ' + e.latlng.lat.toFixed(4) + ', Long: ' + e.latlng.lng.toFixed(4);
            });

            const data = await (await fetch('/api/features')).json();
            const vectorLayer = L.geoJSON(data, {
                style: featureStyle,
                onEachFeature: (feature, layer) => {
                    layer.on('click', (e) => {
                        L.DomEvent.stopPropagation(e);
                        sendClick(feature.properties._index, e.latlng);
                    });
                    layer.on('mouseover', () => { map.getContainer().style.cursor = 'pointer'; });
                    layer.on('mouseout', () => { map.getContainer().style.cursor = ''; });
                }
            }).addTo(map);

            // A click that hits no feature hides the popup.
            map.on('click', (e) => { sendClick(null, e.latlng); });

            // Closing via the popup's own control is an explicit close.
            map.on('popupclose', () => {
                if (!applyingState) postJson('/api/close', {});
            });

            const overlays = {};
            overlays[config.title] = vectorLayer;
            L.control.layers(baseLayers, overlays).addTo(map);

            const legend = L.control({ position: 'topright' });
            legend.onAdd = () => {
                const div = L.DomUtil.create('div', 'legend');
                let html = '<h4>Leyenda</h4>';
                config.legend.forEach(entry => {
                    html += '<div><i style="background:' + entry.color + '"></i>' + entry.category + '</div>';
                });
                div.innerHTML = html;
                return div;
            };
            legend.addTo(map);

            // Restore popup state on reload
            const current = await (await fetch('/api/popup')).json();
            applyPopupState(current);
        }

        init();
    </script>
</body>
</html>"#;
